use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::error::FileAccessContext;

/// Tables and their columns, in the order they were defined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    tables: Vec<(String, Vec<String>)>,
}

impl Schema {
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn get(&self, table: &str) -> Option<&[String]> {
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, columns)| columns.as_slice())
    }

    /// Redefining a table replaces its columns but keeps its position.
    pub fn insert(&mut self, table: String, columns: Vec<String>) {
        match self.tables.iter_mut().find(|(name, _)| *name == table) {
            Some((_, existing)) => *existing = columns,
            None => self.tables.push((table, columns)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.tables
            .iter()
            .map(|(name, columns)| (name.as_str(), columns.as_slice()))
    }
}

fn table_re() -> &'static Regex {
    static TABLE_RE: OnceLock<Regex> = OnceLock::new();
    TABLE_RE.get_or_init(|| {
        Regex::new(r"^(\w+)\((.*?)\)").expect("invalid table pattern, should never happen")
    })
}

/// Parses lines of the form `table(col1, col2, ...)`. Lines that are blank or
/// do not look like a table definition are skipped, so comments and malformed
/// lines never abort parsing.
pub fn parse_schema(text: &str) -> Schema {
    let mut schema = Schema::default();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(captures) = table_re().captures(line) else {
            debug!("skipping line {idx} of schema, not a table definition: '{line}'");
            continue;
        };
        let columns = captures[2]
            .split(',')
            .map(|c| c.trim().to_string())
            .collect();
        schema.insert(captures[1].to_string(), columns);
    }
    schema
}

pub fn read_schema(path: impl AsRef<Path>) -> anyhow::Result<Schema> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).file_access(path)?;
    Ok(parse_schema(&text))
}
