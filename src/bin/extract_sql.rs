use std::collections::HashMap;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use log::info;
use nl2sql_utils::{
    postprocessing::{extract_from_json_lines, write_statements, SqlSource},
    schema::read_schema,
};

/// Extracts one sql statement per model response. Responses are given as
/// json lines, each either a string, null, or an object with a "response" key.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long)]
    responses: PathBuf,

    /// Output file, one statement per line, stdout if not given
    #[arg(short, long)]
    out: Option<PathBuf>,

    #[arg(short, long)]
    schema: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Some(schema_path) = &args.schema {
        let schema = read_schema(schema_path)?;
        info!("schema at {schema_path:?} defines {} tables", schema.len());
        for (table, columns) in schema.iter() {
            info!("{table}: {}", columns.join(", "));
        }
    }

    let extracted = extract_from_json_lines(&args.responses)?;
    match &args.out {
        Some(path) => {
            write_statements(&extracted, path)?;
            info!("saved extracted statements to {path:?}");
        }
        None => {
            let mut out = BufWriter::new(io::stdout().lock());
            for (sql, _) in &extracted {
                writeln!(out, "{sql}")?;
            }
            out.flush()?;
        }
    }

    let mut sources: HashMap<SqlSource, usize> = HashMap::new();
    for (_, source) in &extracted {
        *sources.entry(*source).or_insert(0) += 1;
    }
    info!(
        "extracted {} statements: {} from code blocks, {} from statements, {} raw, {} empty",
        extracted.len(),
        sources.get(&SqlSource::CodeBlock).unwrap_or(&0),
        sources.get(&SqlSource::Statement).unwrap_or(&0),
        sources.get(&SqlSource::Raw).unwrap_or(&0),
        sources.get(&SqlSource::Empty).unwrap_or(&0),
    );
    Ok(())
}
