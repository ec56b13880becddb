use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::OnceLock;

use anyhow::anyhow;
use log::debug;
use regex::Regex;
use serde_json::Value;

use crate::error::FileAccessContext;

/// Where in a model response the extracted statement was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlSource {
    CodeBlock,
    Statement,
    Raw,
    Empty,
}

fn code_block_re() -> &'static Regex {
    static CODE_BLOCK_RE: OnceLock<Regex> = OnceLock::new();
    CODE_BLOCK_RE.get_or_init(|| {
        Regex::new(r"(?is)```sql(.*?)```").expect("invalid code block pattern, should never happen")
    })
}

fn statement_re() -> &'static Regex {
    static STATEMENT_RE: OnceLock<Regex> = OnceLock::new();
    STATEMENT_RE.get_or_init(|| {
        Regex::new(r"(?is)(SELECT .*?;)").expect("invalid statement pattern, should never happen")
    })
}

/// Picks a sql statement out of a model response, together with the place
/// it was found. The first fenced sql block wins, then the first
/// `SELECT ... ;` span, then the whole response. The result is trimmed and
/// flattened to a single line. No attempt is made to validate the statement.
pub fn extract_sql_query_with_source(response: Option<&str>) -> (String, SqlSource) {
    let response = match response {
        Some(r) if !r.is_empty() => r,
        _ => return (String::new(), SqlSource::Empty),
    };
    let (sql, source) = if let Some(block) = code_block_re().captures(response) {
        let content = block.get(1).map_or("", |m| m.as_str());
        (content.trim(), SqlSource::CodeBlock)
    } else if let Some(statement) = statement_re().find(response) {
        (statement.as_str().trim(), SqlSource::Statement)
    } else {
        (response.trim(), SqlSource::Raw)
    };
    debug!("extracted sql from {source:?}");
    (sql.replace('\n', " ").trim().to_string(), source)
}

pub fn extract_sql_query(response: Option<&str>) -> String {
    extract_sql_query_with_source(response).0
}

/// A response is either a json string, null, or an object with a
/// "response" key that is a string or null (a missing key counts as null).
pub fn response_from_json(value: Value) -> anyhow::Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Object(mut map) => match map.remove("response") {
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Null) | None => Ok(None),
            Some(other) => Err(anyhow!("expected response to be a string, got {other}")),
        },
        other => Err(anyhow!("expected a string or an object, got {other}")),
    }
}

/// Extracts one statement per non-blank line of a json lines file of
/// model responses, in file order.
pub fn extract_from_json_lines(
    path: impl AsRef<Path>,
) -> anyhow::Result<Vec<(String, SqlSource)>> {
    let path = path.as_ref();
    let file = File::open(path).file_access(path)?;
    let mut extracted = vec![];
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.file_access(path)?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)
            .map_err(|e| anyhow!("invalid json on line {idx}: {e}"))?;
        let response = response_from_json(value)
            .map_err(|e| anyhow!("invalid response on line {idx}: {e}"))?;
        extracted.push(extract_sql_query_with_source(response.as_deref()));
    }
    Ok(extracted)
}

/// Writes one statement per line, replacing any existing file.
pub fn write_statements(
    statements: &[(String, SqlSource)],
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path).file_access(path)?);
    for (sql, _) in statements {
        writeln!(out, "{sql}").file_access(path)?;
    }
    out.flush().file_access(path)?;
    Ok(())
}
