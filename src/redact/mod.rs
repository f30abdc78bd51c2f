//! Redaction: sanitization, structural field redaction, and pattern-based
//! textual redaction
//!
//! Runs between ingress and the formatter. Sanitization (see [`sanitize`])
//! always runs, independent of [`crate::config::RedactionMode`]. Structural
//! field-name redaction short-circuits before the more expensive textual
//! regex scan: a field whose *name* looks sensitive is redacted wholesale
//! without ever running the pattern set against its value.

pub mod custom;
pub mod patterns;
pub mod sanitize;

use crate::config::{RedactionMode, SecurityConfig};
use crate::error::Result;
use crate::record::{Field, FieldValue, Record};
use patterns::NamedPattern;

const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

/// Field names that trigger redaction only on an exact (case-insensitive)
/// match — short enough that substring matching would produce false
/// positives (e.g. "key" inside "keyboard_layout").
const EXACT_SENSITIVE_NAMES: &[&str] = &[
    "pwd", "pw", "ssn", "pin", "cvv", "key", "otp", "dob", "iban", "db", "url", "uri", "conn",
];

/// Field names that trigger redaction on a case-insensitive substring match.
const SUBSTRING_SENSITIVE_NAMES: &[&str] = &[
    "password", "passwd", "secret", "token", "credential", "authorization",
    "apikey", "api_key", "access_key", "private_key", "session_id",
    "auth", "bearer",
];

/// Compiled pattern set plus the per-record policy needed to apply it.
pub struct Redactor {
    mode: RedactionMode,
    field_redaction: bool,
    max_record_bytes: usize,
    patterns: Vec<NamedPattern>,
    custom: Vec<regex::Regex>,
}

impl Redactor {
    pub fn new(config: &SecurityConfig) -> Result<Self> {
        let patterns = match config.mode {
            RedactionMode::Disabled => Vec::new(),
            RedactionMode::Basic => patterns::basic(),
            RedactionMode::Full => patterns::full(),
        };

        let mut custom = Vec::with_capacity(config.custom_patterns.len());
        for source in &config.custom_patterns {
            custom.push(custom::compile_checked(source, config.max_repetition)?);
        }

        Ok(Self {
            mode: config.mode,
            field_redaction: config.field_redaction,
            max_record_bytes: config.max_record_bytes,
            patterns,
            custom,
        })
    }

    /// Applies sanitization and (mode-permitting) redaction to every text
    /// surface on `record` in place: the message, and every `Str`/`Error`
    /// field value. Non-textual field values (numbers, durations,
    /// timestamps, bytes, composites) are left untouched — the textual
    /// pattern engine has nothing to scan there.
    pub fn redact(&self, record: &mut Record) {
        record.message = sanitize::sanitize(&record.message);
        if self.mode != RedactionMode::Disabled {
            record.message = self.redact_text(&record.message);
        }

        for field in &mut record.fields {
            self.redact_field(field);
        }

        self.enforce_size_cap(record);
    }

    fn redact_field(&self, field: &mut Field) {
        if self.field_redaction && self.mode != RedactionMode::Disabled && self.name_is_sensitive(&field.name) {
            field.value = FieldValue::Str(REDACTED_PLACEHOLDER.to_string());
            return;
        }

        match &mut field.value {
            FieldValue::Str(s) => {
                *s = sanitize::sanitize(s);
                if self.mode != RedactionMode::Disabled {
                    *s = self.redact_text(s);
                }
            }
            FieldValue::Error(e) => {
                *e = sanitize::sanitize(e);
                if self.mode != RedactionMode::Disabled {
                    *e = self.redact_text(e);
                }
            }
            _ => {}
        }
    }

    fn name_is_sensitive(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        if EXACT_SENSITIVE_NAMES.contains(&lower.as_str()) {
            return true;
        }
        SUBSTRING_SENSITIVE_NAMES.iter().any(|needle| lower.contains(needle))
    }

    fn redact_text(&self, text: &str) -> String {
        let mut out = text.to_string();
        for p in &self.patterns {
            out = p.regex.replace_all(&out, REDACTED_PLACEHOLDER).into_owned();
        }
        for re in &self.custom {
            out = re.replace_all(&out, REDACTED_PLACEHOLDER).into_owned();
        }
        out
    }

    /// Truncates the message if the record's approximate serialized size
    /// exceeds `max_record_bytes`. A coarse guard, not a precise formatter-
    /// level cap — the formatter still applies its own quoting/escaping on
    /// top of whatever survives here.
    fn enforce_size_cap(&self, record: &mut Record) {
        if self.max_record_bytes == 0 {
            return;
        }
        let fields_len: usize = record.fields.iter().map(|f| f.name.len() + 16).sum();
        let total = record.message.len() + fields_len;
        if total > self.max_record_bytes {
            let budget = self.max_record_bytes.saturating_sub(fields_len).max(32);
            let mut end = budget.min(record.message.len());
            while end > 0 && !record.message.is_char_boundary(end) {
                end -= 1;
            }
            record.message.truncate(end);
            record.message.push_str("...[TRUNCATED]");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Severity;

    fn redactor(mode: RedactionMode) -> Redactor {
        let cfg = SecurityConfig {
            mode,
            ..SecurityConfig::default()
        };
        Redactor::new(&cfg).unwrap()
    }

    #[test]
    fn structural_redaction_hides_sensitive_field_values_wholesale() {
        let r = redactor(RedactionMode::Basic);
        let mut record = Record::new(Severity::Info, "login")
            .with_field(Field::str("password", "hunter2"));
        r.redact(&mut record);
        let field = record.field("password").unwrap();
        assert!(matches!(&field.value, FieldValue::Str(s) if s == "[REDACTED]"));
    }

    #[test]
    fn textual_redaction_catches_email_in_full_mode() {
        let r = redactor(RedactionMode::Full);
        let mut record = Record::new(Severity::Info, "contact a.b@example.com now");
        r.redact(&mut record);
        assert!(!record.message.contains("a.b@example.com"));
        assert!(record.message.contains("[REDACTED]"));
    }

    #[test]
    fn basic_mode_does_not_redact_email() {
        let r = redactor(RedactionMode::Basic);
        let mut record = Record::new(Severity::Info, "contact a.b@example.com now");
        r.redact(&mut record);
        assert!(record.message.contains("a.b@example.com"));
    }

    #[test]
    fn disabled_mode_skips_redaction_but_still_sanitizes() {
        let r = redactor(RedactionMode::Disabled);
        let mut record = Record::new(Severity::Info, "email a.b@example.com\nnext\0line");
        r.redact(&mut record);
        assert!(record.message.contains("a.b@example.com"));
        assert!(record.message.contains("\\n"));
        assert!(!record.message.contains('\0'));
    }

    #[test]
    fn custom_pattern_is_applied_when_safe() {
        let cfg = SecurityConfig {
            mode: RedactionMode::Basic,
            custom_patterns: vec![r"CUSTOM-\d{4}".to_string()],
            ..SecurityConfig::default()
        };
        let r = Redactor::new(&cfg).unwrap();
        let mut record = Record::new(Severity::Info, "ticket CUSTOM-1234 opened");
        r.redact(&mut record);
        assert!(!record.message.contains("CUSTOM-1234"));
    }

    #[test]
    fn unsafe_custom_pattern_is_rejected_at_construction() {
        let cfg = SecurityConfig {
            mode: RedactionMode::Basic,
            custom_patterns: vec!["(a+)+".to_string()],
            ..SecurityConfig::default()
        };
        assert!(Redactor::new(&cfg).is_err());
    }

    #[test]
    fn oversized_message_is_truncated() {
        let cfg = SecurityConfig {
            mode: RedactionMode::Disabled,
            max_record_bytes: 64,
            ..SecurityConfig::default()
        };
        let r = Redactor::new(&cfg).unwrap();
        let mut record = Record::new(Severity::Info, "x".repeat(200));
        r.redact(&mut record);
        assert!(record.message.len() < 200);
        assert!(record.message.ends_with("...[TRUNCATED]"));
    }
}
