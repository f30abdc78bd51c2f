//! Dynamic caller-site detection
//!
//! Walks the current stack with the `backtrace` crate to find the first
//! frame outside this crate's own module path, so `Logger::info!`-style
//! call sites attribute to the user's code rather than to a helper inside
//! `logger.rs`. Disabled by default (`dynamic_caller = false`) — the walk
//! costs real time per call and most deployments are happy attributing to
//! the statically-known call site instead.

use crate::record::CallerSite;

/// Frames beyond this many are not inspected; a symbol-less or
/// deeply-nested stack falls back to `None` rather than scanning forever.
const FRAME_BUDGET: usize = 20;

/// Module path prefix used to recognize (and skip) this crate's own frames.
const OWN_CRATE_MARKER: &str = "logly::";

/// Walks the stack looking for the first frame that is not part of this
/// crate's own logging machinery. Returns `None` if no such frame is found
/// within the frame budget, or if the platform can't resolve symbols.
pub fn detect(full_path: bool) -> Option<CallerSite> {
    let mut found = None;
    let mut frames_seen = 0usize;

    backtrace::trace(|frame| {
        frames_seen += 1;
        if frames_seen > FRAME_BUDGET {
            return false;
        }

        let mut keep_going = true;
        backtrace::resolve_frame(frame, |symbol| {
            if found.is_some() {
                return;
            }
            let Some(name) = symbol.name() else { return };
            let name = name.to_string();
            if name.contains(OWN_CRATE_MARKER) || name.starts_with("backtrace::") {
                return;
            }
            let Some(filename) = symbol.filename() else { return };
            let line = symbol.lineno().unwrap_or(0);
            let file = if full_path {
                filename.display().to_string()
            } else {
                filename
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_else(|| filename.display().to_string())
            };
            found = Some(CallerSite { file, line });
            keep_going = false;
        });

        keep_going && found.is_none()
    });

    found
}
