use std::fmt;
use std::path::Path;

use anyhow::anyhow;
use log::info;
use tokenizers::Tokenizer;

pub const DEFAULT_PRETRAINED: &str = "google-t5/t5-small";

/// The tokenize trait defines the single capability the statistics need
/// from a tokenizer: splitting a string into token strings.
pub trait Tokenize {
    /// Identifying name, used to label preprocessed statistics.
    fn name(&self) -> &str;

    fn tokenize(&self, s: &str) -> anyhow::Result<Vec<String>>;
}

/// This enum defines all tokenizers that are supported by this crate.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenizerConfig {
    Whitespace,
    /// Either a local tokenizer.json file or a pretrained identifier on the hub.
    HuggingFace(String),
}

impl TokenizerConfig {
    /// "whitespace" always selects the built-in tokenizer, even if a file
    /// with that name exists; use "./whitespace" to load such a file.
    pub fn parse(s: &str) -> Self {
        match s {
            "whitespace" => TokenizerConfig::Whitespace,
            other => TokenizerConfig::HuggingFace(other.to_string()),
        }
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig::HuggingFace(DEFAULT_PRETRAINED.to_string())
    }
}

impl fmt::Display for TokenizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizerConfig::Whitespace => write!(f, "whitespace"),
            TokenizerConfig::HuggingFace(name) => write!(f, "{name}"),
        }
    }
}

pub fn tokenizer(cfg: &TokenizerConfig) -> anyhow::Result<Box<dyn Tokenize>> {
    Ok(match cfg {
        TokenizerConfig::Whitespace => Box::new(WhitespaceTokenizer::default()),
        TokenizerConfig::HuggingFace(name) => Box::new(HuggingFaceTokenizer::load(name)?),
    })
}

/// Splits on unicode whitespace, mostly useful for quick runs without a model.
#[derive(Debug, Clone, Default)]
pub struct WhitespaceTokenizer {}

impl Tokenize for WhitespaceTokenizer {
    fn name(&self) -> &str {
        "whitespace"
    }

    fn tokenize(&self, s: &str) -> anyhow::Result<Vec<String>> {
        Ok(s.split_whitespace().map(|t| t.to_string()).collect())
    }
}

/// Wraps a subword tokenizer from the tokenizers crate. Tokenization does
/// not add any special tokens, so only the subword pieces are counted.
pub struct HuggingFaceTokenizer {
    inner: Tokenizer,
    name: String,
}

impl HuggingFaceTokenizer {
    pub fn new(inner: Tokenizer, name: impl Into<String>) -> Self {
        Self {
            inner,
            name: name.into(),
        }
    }

    /// Loads from a local tokenizer.json if the path exists, otherwise
    /// treats the name as a pretrained identifier and fetches it.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        let inner = if Path::new(name).exists() {
            info!("loading tokenizer from file {name}");
            Tokenizer::from_file(name)
                .map_err(|e| anyhow!("failed to load tokenizer from {name}: {e}"))?
        } else {
            info!("loading pretrained tokenizer {name}");
            Tokenizer::from_pretrained(name, None)
                .map_err(|e| anyhow!("failed to load pretrained tokenizer {name}: {e}"))?
        };
        Ok(Self::new(inner, name))
    }
}

impl Tokenize for HuggingFaceTokenizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn tokenize(&self, s: &str) -> anyhow::Result<Vec<String>> {
        let encoding = self
            .inner
            .encode(s, false)
            .map_err(|e| anyhow!("failed to tokenize '{s}': {e}"))?;
        Ok(encoding.get_tokens().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::{Tokenize, TokenizerConfig, WhitespaceTokenizer, DEFAULT_PRETRAINED};

    #[test]
    fn test_whitespace_tokenizer() {
        let tok = WhitespaceTokenizer::default();
        assert_eq!(
            tok.tokenize(" SELECT *\tFROM  t ;").unwrap(),
            vec!["SELECT", "*", "FROM", "t", ";"]
        );
        assert!(tok.tokenize("   ").unwrap().is_empty());
        assert_eq!(tok.name(), "whitespace");
    }

    #[test]
    fn test_tokenizer_config() {
        assert_eq!(TokenizerConfig::parse("whitespace"), TokenizerConfig::Whitespace);
        assert_eq!(
            TokenizerConfig::parse("t5.json"),
            TokenizerConfig::HuggingFace("t5.json".to_string())
        );
        assert_eq!(
            TokenizerConfig::parse("./whitespace"),
            TokenizerConfig::HuggingFace("./whitespace".to_string())
        );
        assert_eq!(TokenizerConfig::default().to_string(), DEFAULT_PRETRAINED);
    }
}
