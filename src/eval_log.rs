use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::info;
use serde_json::Value;

use crate::error::FileAccessContext;

/// Error messages collected while evaluating model outputs, either as
/// free text or as a json list / mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorMessages {
    Text(String),
    Structured(Value),
}

impl ErrorMessages {
    pub fn render(&self) -> anyhow::Result<String> {
        Ok(match self {
            ErrorMessages::Text(s) => s.clone(),
            ErrorMessages::Structured(v @ (Value::Array(_) | Value::Object(_))) => {
                escape_non_ascii(&serde_json::to_string_pretty(v)?)
            }
            ErrorMessages::Structured(Value::String(s)) => s.clone(),
            ErrorMessages::Structured(v) => v.to_string(),
        })
    }
}

/// Escapes non-ascii characters as `\uXXXX` (surrogate pairs outside the
/// basic plane). They can only occur inside json strings, so the result
/// is still valid json.
fn escape_non_ascii(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    let mut buf = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() {
            escaped.push(c);
            continue;
        }
        for unit in c.encode_utf16(&mut buf).iter() {
            escaped.push_str(&format!("\\u{unit:04x}"));
        }
    }
    escaped
}

impl From<String> for ErrorMessages {
    fn from(s: String) -> Self {
        ErrorMessages::Text(s)
    }
}

impl From<&str> for ErrorMessages {
    fn from(s: &str) -> Self {
        ErrorMessages::Text(s.to_string())
    }
}

impl From<Vec<String>> for ErrorMessages {
    fn from(msgs: Vec<String>) -> Self {
        ErrorMessages::Structured(Value::from(msgs))
    }
}

impl From<Value> for ErrorMessages {
    fn from(v: Value) -> Self {
        ErrorMessages::Structured(v)
    }
}

pub fn format_logs(
    sql_em: f64,
    record_em: f64,
    record_f1: f64,
    error_msgs: &ErrorMessages,
) -> anyhow::Result<String> {
    let mut log = String::new();
    writeln!(log, "SQL EM: {sql_em:.4}")?;
    writeln!(log, "Record EM: {record_em:.4}")?;
    writeln!(log, "Record F1: {record_f1:.4}")?;
    log.push_str("\nModel Error Messages:\n");
    log.push_str(&error_msgs.render()?);
    Ok(log)
}

/// Writes evaluation metrics and error messages to the given file, creating
/// missing parent directories. Metrics are written as is, without clamping.
pub fn save_logs(
    output_path: impl AsRef<Path>,
    sql_em: f64,
    record_em: f64,
    record_f1: f64,
    error_msgs: &ErrorMessages,
) -> anyhow::Result<()> {
    let path = output_path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).file_access(dir)?;
    }
    let log = format_logs(sql_em, record_em, record_f1, error_msgs)?;
    fs::write(path, log).file_access(path)?;
    info!("saved evaluation logs to {path:?}");
    Ok(())
}
