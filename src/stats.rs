use std::collections::HashSet;

use log::{debug, info};
use serde::Serialize;

use crate::corpus::{DataSplits, Split};
use crate::tokenization::Tokenize;
use crate::utils::{mean, progress_bar};

pub const DEFAULT_PREFIX: &str = "translate to SQL: ";
pub const DEFAULT_MAX_SRC_LEN: usize = 256;
pub const DEFAULT_MAX_TGT_LEN: usize = 128;

/// Mean tokenized length and number of distinct tokens of a corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TokenStats {
    pub mean_length: f64,
    pub vocab_size: usize,
}

/// Tokenizes every line, optionally with a prefix prepended and truncated to
/// the first max_len tokens, and collects lengths and the vocabulary.
pub fn measure(
    lines: &[impl AsRef<str>],
    tok: &dyn Tokenize,
    max_len: Option<usize>,
    prefix: Option<&str>,
) -> anyhow::Result<TokenStats> {
    let mut lengths = Vec::with_capacity(lines.len());
    let mut vocab = HashSet::new();
    for line in lines {
        let line = line.as_ref();
        let mut tokens = match prefix {
            Some(prefix) => tok.tokenize(&format!("{prefix}{line}"))?,
            None => tok.tokenize(line)?,
        };
        if let Some(max_len) = max_len {
            tokens.truncate(max_len);
        }
        lengths.push(tokens.len());
        vocab.extend(tokens);
    }
    Ok(TokenStats {
        mean_length: mean(&lengths),
        vocab_size: vocab.len(),
    })
}

/// Preprocessing applied before training: the prefix and source truncation
/// apply to the natural language side, the target truncation to SQL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreprocessingConfig {
    pub prefix: String,
    pub max_src_len: usize,
    pub max_tgt_len: usize,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            max_src_len: DEFAULT_MAX_SRC_LEN,
            max_tgt_len: DEFAULT_MAX_TGT_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SplitStats {
    pub num_examples: usize,
    pub nl: TokenStats,
    pub sql: TokenStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatsTable {
    pub train: SplitStats,
    pub dev: SplitStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub model_name: String,
    pub preprocessing: PreprocessingConfig,
    pub before: StatsTable,
    pub after: StatsTable,
}

impl StatisticsReport {
    pub fn build(
        splits: &DataSplits,
        tok: &dyn Tokenize,
        cfg: &PreprocessingConfig,
        show_progress: bool,
    ) -> anyhow::Result<Self> {
        Self::build_with_name(splits, tok, tok.name(), cfg, show_progress)
    }

    /// Same as build, but labels the preprocessed statistics with the given
    /// model name instead of the tokenizer name.
    pub fn build_with_name(
        splits: &DataSplits,
        tok: &dyn Tokenize,
        model_name: &str,
        cfg: &PreprocessingConfig,
        show_progress: bool,
    ) -> anyhow::Result<Self> {
        let pbar = progress_bar("measuring corpora", 8, !show_progress);
        let table = |split: &Split,
                     nl_max_len: Option<usize>,
                     sql_max_len: Option<usize>,
                     prefix: Option<&str>|
         -> anyhow::Result<SplitStats> {
            let nl = measure(&split.nl, tok, nl_max_len, prefix)?;
            pbar.inc(1);
            let sql = measure(&split.sql, tok, sql_max_len, None)?;
            pbar.inc(1);
            Ok(SplitStats {
                num_examples: split.len(),
                nl,
                sql,
            })
        };

        let before = StatsTable {
            train: table(&splits.train, None, None, None)?,
            dev: table(&splits.dev, None, None, None)?,
        };
        debug!("statistics before preprocessing: {before:?}");

        let prefix = Some(cfg.prefix.as_str()).filter(|p| !p.is_empty());
        let src = Some(cfg.max_src_len);
        let tgt = Some(cfg.max_tgt_len);
        let after = StatsTable {
            train: table(&splits.train, src, tgt, prefix)?,
            dev: table(&splits.dev, src, tgt, prefix)?,
        };
        debug!("statistics after preprocessing: {after:?}");
        pbar.finish_and_clear();
        info!("computed dataset statistics with tokenizer {}", tok.name());

        Ok(Self {
            model_name: model_name.to_string(),
            preprocessing: cfg.clone(),
            before,
            after,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::corpus::{DataSplits, Split};
    use crate::tokenization::{Tokenize, WhitespaceTokenizer};

    use super::{measure, PreprocessingConfig, StatisticsReport, TokenStats};

    fn lines(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_measure() {
        let tok = WhitespaceTokenizer::default();
        let corpus = lines(&["show me flights", "show me all fares to boston"]);
        let stats = measure(&corpus, &tok, None, None).unwrap();
        assert!((stats.mean_length - 4.5).abs() < 1e-8);
        // show, me, flights, all, fares, to, boston
        assert_eq!(stats.vocab_size, 7);

        let empty: Vec<String> = vec![];
        assert_eq!(
            measure(&empty, &tok, Some(3), Some("x: ")).unwrap(),
            TokenStats {
                mean_length: 0.0,
                vocab_size: 0
            }
        );
    }

    #[test]
    fn test_measure_truncation() {
        let tok = WhitespaceTokenizer::default();
        let line = "a b c d e f";
        let full = tok.tokenize(line).unwrap().len();
        for max_len in 0..10 {
            let stats = measure(&[line], &tok, Some(max_len), None).unwrap();
            assert_eq!(stats.mean_length, full.min(max_len) as f64);
        }
        // leftmost tokens are kept
        let stats = measure(&["a b c", "a d e"], &tok, Some(1), None).unwrap();
        assert_eq!(stats.vocab_size, 1);
        let stats = measure(&["a b c"], &tok, Some(0), None).unwrap();
        assert_eq!(stats.vocab_size, 0);
    }

    #[test]
    fn test_measure_prefix() {
        let tok = WhitespaceTokenizer::default();
        let corpus = lines(&["flights from denver", "cheapest fare", "x"]);
        let plain = measure(&corpus, &tok, None, None).unwrap();
        let prefixed = measure(&corpus, &tok, None, Some("translate to SQL: ")).unwrap();
        assert!(prefixed.mean_length >= plain.mean_length);
        assert!(prefixed.vocab_size >= plain.vocab_size);
        assert!((prefixed.mean_length - plain.mean_length - 3.0).abs() < 1e-8);
        assert_eq!(prefixed.vocab_size, plain.vocab_size + 3);
    }

    #[test]
    fn test_build_report() {
        let tok = WhitespaceTokenizer::default();
        let splits = DataSplits {
            train: Split {
                nl: lines(&["list all flights", "show fares"]),
                sql: lines(&["SELECT * FROM flight ;", "SELECT fare FROM fare ;"]),
            },
            dev: Split {
                nl: lines(&["show airlines"]),
                sql: lines(&["SELECT * FROM airline ;"]),
            },
        };
        let cfg = PreprocessingConfig {
            prefix: "nl2sql: ".to_string(),
            max_src_len: 2,
            max_tgt_len: 3,
        };
        let report = StatisticsReport::build(&splits, &tok, &cfg, false).unwrap();
        assert_eq!(report.model_name, "whitespace");
        assert_eq!(report.before.train.num_examples, 2);
        assert_eq!(report.after.dev.num_examples, 1);
        assert!((report.before.train.nl.mean_length - 2.5).abs() < 1e-8);
        assert_eq!(report.before.train.nl.vocab_size, 5);
        assert!((report.before.dev.sql.mean_length - 5.0).abs() < 1e-8);
        // prefix token plus the first nl token
        assert_eq!(report.after.train.nl.mean_length, 2.0);
        assert_eq!(report.after.train.nl.vocab_size, 3);
        assert_eq!(report.after.train.sql.mean_length, 3.0);
        assert_eq!(report.after.dev.sql.vocab_size, 3);
    }

    #[test]
    fn test_build_report_empty() {
        let tok = WhitespaceTokenizer::default();
        let report = StatisticsReport::build_with_name(
            &DataSplits::default(),
            &tok,
            "T5-small",
            &PreprocessingConfig::default(),
            false,
        )
        .unwrap();
        assert_eq!(report.model_name, "T5-small");
        assert_eq!(report.before.train.nl, TokenStats::default());
        assert_eq!(report.after.dev.sql, TokenStats::default());
    }
}
