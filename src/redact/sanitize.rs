//! Always-on output sanitization
//!
//! Runs regardless of `RedactionMode` — even `Disabled` still strips control
//! characters and escapes newlines, since an attacker-controlled message must
//! never be able to forge extra log lines or terminal escape sequences.

/// Strips NUL/DEL, escapes CR/LF, strips ANSI/OSC/DCS/APC/PM/SOS sequences,
/// and strips zero-width/bidi-override/BOM code points.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\0' | '\u{7f}' => continue,
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\x1b' => {
                skip_escape_sequence(&mut chars);
            }
            '\u{9d}' | '\u{9b}' | '\u{90}' | '\u{98}' | '\u{9e}' | '\u{9f}' => {
                // 8-bit C1 equivalents of OSC/CSI/DCS/SOS/PM/APC
                skip_c1_sequence(&mut chars);
            }
            c if is_zero_width_or_bidi(c) => continue,
            '\u{feff}' => continue,
            c => out.push(c),
        }
    }

    out
}

/// Consumes a 7-bit `ESC`-prefixed escape sequence: CSI (`ESC [ ... final`),
/// OSC (`ESC ] ... BEL|ST`), or a single two-char sequence (DCS/APC/PM/SOS
/// use `ESC P/X/^/_` and are terminated the same way OSC is, by `ST`/`BEL`).
fn skip_escape_sequence(chars: &mut std::iter::Peekable<std::str::Chars>) {
    match chars.peek() {
        Some('[') => {
            chars.next();
            for c in chars.by_ref() {
                if ('\u{40}'..='\u{7e}').contains(&c) {
                    break;
                }
            }
        }
        Some(']') | Some('P') | Some('X') | Some('^') | Some('_') => {
            chars.next();
            skip_until_string_terminator(chars);
        }
        Some(_) => {
            chars.next();
        }
        None => {}
    }
}

fn skip_c1_sequence(chars: &mut std::iter::Peekable<std::str::Chars>) {
    skip_until_string_terminator(chars);
}

/// Consumes characters up to and including a String Terminator: `BEL`
/// (`\x07`), the 8-bit `ST` (`\u{9c}`), or the 7-bit form `ESC \`.
fn skip_until_string_terminator(chars: &mut std::iter::Peekable<std::str::Chars>) {
    while let Some(c) = chars.next() {
        match c {
            '\u{07}' | '\u{9c}' => return,
            '\x1b' => {
                if chars.peek() == Some(&'\\') {
                    chars.next();
                }
                return;
            }
            _ => {}
        }
    }
}

fn is_zero_width_or_bidi(c: char) -> bool {
    matches!(
        c,
        '\u{200b}'..='\u{200f}' // zero-width space/joiners, LRM/RLM
            | '\u{202a}'..='\u{202e}' // bidi embedding/override controls
            | '\u{2060}'..='\u{2064}' // word joiner and invisible operators
            | '\u{2066}'..='\u{2069}' // bidi isolates
    )
}

/// Detects CESU-8/overlong UTF-8 sequences that `str` itself can never
/// contain (Rust strings are always valid UTF-8) but that can arrive via
/// byte-level paths such as file path validation. Exposed for
/// `crate::sink::file::validate_path`.
pub fn has_overlong_utf8_sequence(bytes: &[u8]) -> bool {
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            i += 1;
        } else if b & 0xe0 == 0xc0 {
            if b < 0xc2 {
                return true;
            }
            i += 2;
        } else if b & 0xf0 == 0xe0 {
            if b == 0xe0 && i + 1 < bytes.len() && bytes[i + 1] < 0xa0 {
                return true;
            }
            i += 3;
        } else if b & 0xf8 == 0xf0 {
            if b == 0xf0 && i + 1 < bytes.len() && bytes[i + 1] < 0x90 {
                return true;
            }
            i += 4;
        } else {
            return true;
        }
    }
    false
}
