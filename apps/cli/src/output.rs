use clap::ValueEnum;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON document
    Json,
    /// One `key: value` line per top-level field
    Text,
}

pub fn render(record: &Value, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(record).unwrap_or_else(|_| record.to_string())
        }
        OutputFormat::Text => match record.as_object() {
            Some(fields) => fields
                .iter()
                .map(|(key, value)| format!("{key}: {}", scalar(value)))
                .collect::<Vec<_>>()
                .join("\n"),
            None => scalar(record),
        },
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
