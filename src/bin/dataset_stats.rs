use std::path::PathBuf;

use clap::Parser;
use nl2sql_utils::{
    corpus::DataSplits,
    report::{format_console, write_json, write_markdown},
    stats::{
        PreprocessingConfig, StatisticsReport, DEFAULT_MAX_SRC_LEN, DEFAULT_MAX_TGT_LEN,
        DEFAULT_PREFIX,
    },
    tokenization::{tokenizer, TokenizerConfig, DEFAULT_PRETRAINED},
};

/// Reports example counts, mean tokenized lengths and vocabulary sizes of
/// the nl and sql corpora before and after preprocessing.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory containing train.nl, dev.nl, train.sql and dev.sql
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    #[arg(long, default_value_t = DEFAULT_MAX_SRC_LEN)]
    max_src_len: usize,

    #[arg(long, default_value_t = DEFAULT_MAX_TGT_LEN)]
    max_tgt_len: usize,

    #[arg(short, long, default_value = "q4_stats.md")]
    out_md: PathBuf,

    #[arg(long)]
    out_json: Option<PathBuf>,

    /// Pretrained identifier, path to a tokenizer.json, or "whitespace" for
    /// the built-in whitespace tokenizer (a local file with that exact name
    /// has to be given as "./whitespace")
    #[arg(short, long, default_value = DEFAULT_PRETRAINED)]
    tokenizer: String,

    /// Model name shown next to the preprocessed statistics, defaults to
    /// the tokenizer name
    #[arg(short, long)]
    model_name: Option<String>,

    #[arg(short, long)]
    progress: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let splits = DataSplits::load(&args.data_dir)?;
    let tok = tokenizer(&TokenizerConfig::parse(&args.tokenizer))?;
    let cfg = PreprocessingConfig {
        prefix: args.prefix,
        max_src_len: args.max_src_len,
        max_tgt_len: args.max_tgt_len,
    };
    let model_name = args.model_name.as_deref().unwrap_or(tok.name());
    let report =
        StatisticsReport::build_with_name(&splits, &*tok, model_name, &cfg, args.progress)?;

    println!("{}", format_console(&report));
    write_markdown(&report, &args.out_md)?;
    if let Some(out_json) = &args.out_json {
        write_json(&report, out_json)?;
    }
    println!("Saved markdown table to: {}", args.out_md.display());
    Ok(())
}
