use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};

use crate::error::FileAccessContext;

pub const TRAIN_NL: &str = "train.nl";
pub const DEV_NL: &str = "dev.nl";
pub const TRAIN_SQL: &str = "train.sql";
pub const DEV_SQL: &str = "dev.sql";

/// Reads all non-empty lines of a file, trimmed and in their original order.
pub fn read_lines(path: impl AsRef<Path>) -> anyhow::Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).file_access(path)?;
    let mut lines = vec![];
    for line in BufReader::new(file).lines() {
        let line = line.file_access(path)?;
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    Ok(lines)
}

/// The natural language and SQL side of a single split.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Split {
    pub nl: Vec<String>,
    pub sql: Vec<String>,
}

impl Split {
    pub fn len(&self) -> usize {
        self.nl.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nl.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSplits {
    pub train: Split,
    pub dev: Split,
}

impl DataSplits {
    /// Loads train.nl, dev.nl, train.sql and dev.sql from the given directory.
    pub fn load(data_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = data_dir.as_ref();
        let splits = Self {
            train: Split {
                nl: read_lines(dir.join(TRAIN_NL))?,
                sql: read_lines(dir.join(TRAIN_SQL))?,
            },
            dev: Split {
                nl: read_lines(dir.join(DEV_NL))?,
                sql: read_lines(dir.join(DEV_SQL))?,
            },
        };
        for (name, split) in [("train", &splits.train), ("dev", &splits.dev)] {
            info!(
                "loaded {name} split from {dir:?}: {} nl lines, {} sql lines",
                split.nl.len(),
                split.sql.len()
            );
            // nl and sql should be line aligned, but we only report it
            if split.nl.len() != split.sql.len() {
                warn!(
                    "{name} split is not aligned: {} nl lines vs. {} sql lines",
                    split.nl.len(),
                    split.sql.len()
                );
            }
        }
        Ok(splits)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::error::FileAccessError;

    use super::{read_lines, DataSplits, DEV_NL, DEV_SQL, TRAIN_NL, TRAIN_SQL};

    #[test]
    fn test_read_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.nl");
        fs::write(&path, "  show all flights \n\n   \nList Airlines!\r\n").unwrap();
        let lines = read_lines(&path).unwrap();
        assert_eq!(lines, vec!["show all flights", "List Airlines!"]);

        fs::write(&path, "").unwrap();
        assert!(read_lines(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_lines_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_lines(dir.path().join("missing.nl")).unwrap_err();
        let err = err.downcast_ref::<FileAccessError>().unwrap();
        assert!(err.path.ends_with("missing.nl"));
    }

    #[test]
    fn test_load_splits() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(TRAIN_NL), "a\nb\n").unwrap();
        fs::write(dir.path().join(TRAIN_SQL), "SELECT 1;\nSELECT 2;\n").unwrap();
        fs::write(dir.path().join(DEV_NL), "c\n").unwrap();
        fs::write(dir.path().join(DEV_SQL), "SELECT 3;\n").unwrap();
        let splits = DataSplits::load(dir.path()).unwrap();
        assert_eq!(splits.train.len(), 2);
        assert_eq!(splits.dev.sql, vec!["SELECT 3;"]);

        fs::remove_file(dir.path().join(DEV_SQL)).unwrap();
        assert!(DataSplits::load(dir.path())
            .unwrap_err()
            .downcast_ref::<FileAccessError>()
            .is_some());
    }
}
