//! Object (JSON) form rendering
//!
//! Key names are configurable via [`crate::config::FieldNameMapping`]; the
//! user's fields are nested under a single configurable key (`fields` by
//! default) rather than flattened into the top level, so a field named
//! `"level"` can never collide with the record's own level key.

use super::time_cache::TimeCache;
use crate::config::LoggerConfig;
use crate::record::Record;
use serde_json::{Map, Value};

pub fn render(record: &Record, config: &LoggerConfig, time_cache: &TimeCache) -> String {
    let names = &config.object_form.field_names;
    let mut root = Map::new();

    if config.include_time {
        let rendered = time_cache.render(record.timestamp);
        root.insert(names.timestamp.clone(), Value::String(rendered.to_string()));
    }

    if config.include_level {
        root.insert(names.level.clone(), Value::String(record.severity.as_str().to_string()));
    }

    if config.include_caller {
        if let Some(ref caller) = record.caller {
            root.insert(
                names.caller.clone(),
                Value::String(format!("{}:{}", caller.file, caller.line)),
            );
        }
    }

    root.insert(names.message.clone(), Value::String(record.message.clone()));

    if !record.fields.is_empty() {
        let mut fields = Map::with_capacity(record.fields.len());
        for field in &record.fields {
            fields.insert(field.name.clone(), field.value.to_json());
        }
        root.insert(names.fields.clone(), Value::Object(fields));
    }

    let value = Value::Object(root);
    if config.object_form.pretty {
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    } else {
        serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string())
    }
}
