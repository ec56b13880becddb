use std::fs;
use std::path::Path;

use itertools::Itertools;
use log::info;

use crate::error::FileAccessContext;
use crate::stats::{StatisticsReport, StatsTable};

pub const TITLE: &str = "Q4 Data Statistics";
pub const BEFORE_TITLE: &str = "Table 1: Before preprocessing";
pub const AFTER_TITLE: &str = "Table 2: After preprocessing";

/// Statistic name, train value and dev value for every row of a table.
/// The number of examples is not changed by preprocessing, so it is only
/// part of the first table.
fn rows(table: &StatsTable, with_examples: bool) -> Vec<(&'static str, String, String)> {
    let StatsTable { train, dev } = table;
    let mut rows = vec![];
    if with_examples {
        rows.push((
            "Number of examples",
            train.num_examples.to_string(),
            dev.num_examples.to_string(),
        ));
    }
    rows.extend([
        (
            "Mean sentence length (NL)",
            format!("{:.2}", train.nl.mean_length),
            format!("{:.2}", dev.nl.mean_length),
        ),
        (
            "Mean SQL query length",
            format!("{:.2}", train.sql.mean_length),
            format!("{:.2}", dev.sql.mean_length),
        ),
        (
            "Vocabulary size (NL)",
            train.nl.vocab_size.to_string(),
            dev.nl.vocab_size.to_string(),
        ),
        (
            "Vocabulary size (SQL)",
            train.sql.vocab_size.to_string(),
            dev.sql.vocab_size.to_string(),
        ),
    ]);
    rows
}

fn console_table(table: &StatsTable, with_examples: bool) -> String {
    rows(table, with_examples)
        .into_iter()
        .map(|(name, train, dev)| format!("{name:<28}| Train {train} | Dev {dev}"))
        .join("\n")
}

fn markdown_table(table: &StatsTable, with_examples: bool) -> String {
    let mut md = String::from("| Statistics Name | Train | Dev |\n|---|---:|---:|\n");
    for (name, train, dev) in rows(table, with_examples) {
        md.push_str(&format!("| {name} | {train} | {dev} |\n"));
    }
    md
}

pub fn format_console(report: &StatisticsReport) -> String {
    format!(
        "\n==== {BEFORE_TITLE} ====\n{}\n\n==== {AFTER_TITLE} ====\nModel name: {}\n{}\n",
        console_table(&report.before, true),
        report.model_name,
        console_table(&report.after, false),
    )
}

pub fn format_markdown(report: &StatisticsReport) -> String {
    let cfg = &report.preprocessing;
    let mut md = format!("# {TITLE}\n## {BEFORE_TITLE}\n");
    md.push_str(&markdown_table(&report.before, true));
    md.push_str(&format!(
        "\n## {AFTER_TITLE}\n_Model: {}; Prefix: `{}`; Src max len={}; Tgt max len={}._\n\n",
        report.model_name, cfg.prefix, cfg.max_src_len, cfg.max_tgt_len
    ));
    md.push_str(&markdown_table(&report.after, false));
    md
}

/// Writes the markdown document, replacing any existing file.
pub fn write_markdown(report: &StatisticsReport, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    fs::write(path, format_markdown(report)).file_access(path)?;
    info!("saved markdown table to {path:?}");
    Ok(())
}

pub fn write_json(report: &StatisticsReport, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).file_access(path)?;
    info!("saved statistics as json to {path:?}");
    Ok(())
}
