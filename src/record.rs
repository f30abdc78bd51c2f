//! Log record structure
//!
//! Defines the `Record` type passed through the pipeline (redactor →
//! formatter → fan-out) and the closed `FieldValue` type set attached to it.
//! A `Record` is ephemeral: it is built at the ingress call, borrowed by
//! every sink in turn, and dropped once fan-out completes.

use crate::level::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum bytes a field name may occupy (spec §3: "non-empty UTF-8, ≤256 bytes").
pub const MAX_FIELD_NAME_BYTES: usize = 256;

/// Depth at which the generic composite encoder gives up and emits the
/// `[MAX_DEPTH_EXCEEDED]` sentinel instead of recursing further.
pub const MAX_COMPOSITE_DEPTH: usize = 100;

/// The source file and line a log call originated from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerSite {
    /// Source file, either basename or full path depending on `fullPath`.
    pub file: String,
    pub line: u32,
}

/// A typed field value, drawn from the closed type set in spec §3.
///
/// `Composite` is the escape hatch for arbitrary structured data; it is
/// rendered through [`encode_composite`], which applies a depth cap so a
/// pathologically self-referential `serde_json::Value` can never recurse
/// unboundedly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(String),
    #[serde(with = "duration_as_secs_f64")]
    Duration(Duration),
    Timestamp(DateTime<Utc>),
    /// An error's display message, carried as text (spec §3: "error (carries a message)").
    Error(String),
    Bytes(Vec<u8>),
    Composite(serde_json::Value),
}

mod duration_as_secs_f64 {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}

impl FieldValue {
    /// Compact canonical text used by the text formatter: RFC3339 for
    /// timestamps, shortest round-trip decimal for floats, human duration
    /// suffix for durations, `key=value` verbatim insertion for composites.
    pub fn canonical_text(&self) -> String {
        match self {
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::I64(v) => v.to_string(),
            FieldValue::U64(v) => v.to_string(),
            FieldValue::F64(v) => format_float(*v),
            FieldValue::Str(s) => s.clone(),
            FieldValue::Duration(d) => format!("{}s", d.as_secs_f64()),
            FieldValue::Timestamp(t) => t.to_rfc3339(),
            FieldValue::Error(e) => e.clone(),
            FieldValue::Bytes(b) => format!("{}B", b.len()),
            FieldValue::Composite(v) => encode_composite(v, 0).to_string(),
        }
    }

    /// JSON value used by the object formatter.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::I64(v) => serde_json::json!(v),
            FieldValue::U64(v) => serde_json::json!(v),
            FieldValue::F64(v) => serde_json::json!(v),
            FieldValue::Str(s) => serde_json::Value::String(s.clone()),
            FieldValue::Duration(d) => serde_json::json!(d.as_secs_f64()),
            FieldValue::Timestamp(t) => serde_json::Value::String(t.to_rfc3339()),
            FieldValue::Error(e) => serde_json::Value::String(e.clone()),
            FieldValue::Bytes(b) => serde_json::Value::String(format!("{}B", b.len())),
            FieldValue::Composite(v) => encode_composite(v, 0),
        }
    }

    /// `true` when the text formatter must quote this value: empty, or
    /// contains whitespace, a quote, or a backslash (spec §4.3).
    pub fn needs_quoting(&self) -> bool {
        match self {
            FieldValue::Str(s) => {
                s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '"' || c == '\\')
            }
            _ => false,
        }
    }
}

/// Shortest round-trip decimal, switching to scientific notation outside a
/// magnitude band (spec §4.3's `1.5e-3` example), the way Go's `%g` picks
/// between its two candidate forms rather than always using fixed-point.
fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0".to_string() } else { "0".to_string() };
    }

    // `{:e}` already gives the shortest round-trip mantissa and decimal
    // exponent; reuse its digits rather than re-deriving them from `v`.
    let exp_form = format!("{:e}", v);
    let (mantissa, exponent) = exp_form.split_once('e').expect("LowerExp output always has an 'e'");
    let exponent: i32 = exponent.parse().expect("LowerExp exponent is a plain integer");

    if exponent < -2 || exponent >= 21 {
        return exp_form;
    }

    let negative = mantissa.starts_with('-');
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    let mut out = String::new();
    if negative {
        out.push('-');
    }

    if exponent < 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-exponent - 1) as usize));
        out.push_str(&digits);
    } else {
        let exponent = exponent as usize;
        if digits.len() > exponent + 1 {
            out.push_str(&digits[..=exponent]);
            out.push('.');
            out.push_str(&digits[exponent + 1..]);
        } else {
            out.push_str(&digits);
            out.extend(std::iter::repeat('0').take(exponent + 1 - digits.len()));
            out.push_str(".0");
        }
    }
    out
}


/// Recursively renders a `serde_json::Value`, replacing anything past
/// [`MAX_COMPOSITE_DEPTH`] with a sentinel rather than recursing further.
/// This is the generic object encoder spec §3/§9 describe for the
/// `Composite` field case.
pub fn encode_composite(value: &serde_json::Value, depth: usize) -> serde_json::Value {
    if depth >= MAX_COMPOSITE_DEPTH {
        return serde_json::Value::String("[MAX_DEPTH_EXCEEDED]".to_string());
    }
    match value {
        serde_json::Value::Array(items) => serde_json::Value::Array(
            items.iter().map(|v| encode_composite(v, depth + 1)).collect(),
        ),
        serde_json::Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), encode_composite(v, depth + 1));
            }
            serde_json::Value::Object(out)
        }
        other => other.clone(),
    }
}

/// A name/value pair attached to a record. Order is preserved (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

impl Field {
    /// Builds a field, clamping the name to [`MAX_FIELD_NAME_BYTES`] and
    /// substituting a placeholder name if the caller passed an empty one
    /// rather than rejecting the call (ingress never fails observably).
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        let mut name = name.into();
        if name.is_empty() {
            name = "_".to_string();
        }
        if name.len() > MAX_FIELD_NAME_BYTES {
            let mut end = MAX_FIELD_NAME_BYTES;
            while !name.is_char_boundary(end) {
                end -= 1;
            }
            name.truncate(end);
        }
        Self { name, value }
    }

    pub fn bool(name: impl Into<String>, v: bool) -> Self {
        Self::new(name, FieldValue::Bool(v))
    }

    pub fn i64(name: impl Into<String>, v: i64) -> Self {
        Self::new(name, FieldValue::I64(v))
    }

    pub fn u64(name: impl Into<String>, v: u64) -> Self {
        Self::new(name, FieldValue::U64(v))
    }

    pub fn f64(name: impl Into<String>, v: f64) -> Self {
        Self::new(name, FieldValue::F64(v))
    }

    pub fn str(name: impl Into<String>, v: impl Into<String>) -> Self {
        Self::new(name, FieldValue::Str(v.into()))
    }

    pub fn duration(name: impl Into<String>, v: Duration) -> Self {
        Self::new(name, FieldValue::Duration(v))
    }

    pub fn timestamp(name: impl Into<String>, v: DateTime<Utc>) -> Self {
        Self::new(name, FieldValue::Timestamp(v))
    }

    pub fn error(name: impl Into<String>, err: &dyn std::error::Error) -> Self {
        Self::new(name, FieldValue::Error(err.to_string()))
    }

    pub fn bytes(name: impl Into<String>, v: impl Into<Vec<u8>>) -> Self {
        Self::new(name, FieldValue::Bytes(v.into()))
    }

    pub fn composite(name: impl Into<String>, v: serde_json::Value) -> Self {
        Self::new(name, FieldValue::Composite(v))
    }
}

/// A single log record, ephemeral for the duration of one logging call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
    pub caller: Option<CallerSite>,
    pub fields: Vec<Field>,
}

impl Record {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            message: message.into(),
            caller: None,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn with_caller(mut self, caller: Option<CallerSite>) -> Self {
        self.caller = caller;
        self
    }

    /// Looks a field up by name. Records may carry duplicate names in text
    /// form (order is preserved per spec §3); this returns the first match,
    /// which is what object-form uniqueness assumes callers rely on.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_encoder_caps_depth_with_a_sentinel() {
        let mut v = serde_json::json!("leaf");
        for _ in 0..(MAX_COMPOSITE_DEPTH + 10) {
            v = serde_json::json!({ "nested": v });
        }
        let encoded = encode_composite(&v, 0);
        let rendered = encoded.to_string();
        assert!(rendered.contains("[MAX_DEPTH_EXCEEDED]"));
    }

    #[test]
    fn composite_encoder_is_identity_for_shallow_values() {
        let v = serde_json::json!({ "a": 1, "b": [1, 2, 3] });
        assert_eq!(encode_composite(&v, 0), v);
    }

    #[test]
    fn field_name_is_never_empty_or_oversized() {
        let f = Field::str("", "x");
        assert_eq!(f.name, "_");

        let long = "a".repeat(500);
        let f = Field::str(long, "x");
        assert!(f.name.len() <= MAX_FIELD_NAME_BYTES);
    }

    #[test]
    fn needs_quoting_covers_whitespace_quotes_and_backslashes() {
        assert!(FieldValue::Str(String::new()).needs_quoting());
        assert!(FieldValue::Str("has space".into()).needs_quoting());
        assert!(FieldValue::Str("has\"quote".into()).needs_quoting());
        assert!(FieldValue::Str("has\\backslash".into()).needs_quoting());
        assert!(!FieldValue::Str("plain".into()).needs_quoting());
    }

    #[test]
    fn order_is_preserved_in_the_fields_vec() {
        let record = Record::new(Severity::Info, "hi")
            .with_field(Field::i64("a", 1))
            .with_field(Field::i64("b", 2))
            .with_field(Field::i64("c", 3));
        let names: Vec<&str> = record.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
