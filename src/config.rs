use crate::error::{RbResult, RimeBenchError};
use clap::{Args, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumString};

/// How the character→code mapping table is obtained.
#[derive(ValueEnum, Display, EnumString, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub enum SchemeMode {
    /// Pre-built `char<TAB>code` table loaded verbatim.
    DirectCode,
    /// Tables derived from the scheme dictionaries, with polyphone
    /// disambiguation.
    Polyphone,
}

/// Option surface consumed by the encoding/scoring core.
#[derive(Args, Debug, Clone)]
pub struct BenchConfig {
    #[arg(long, value_enum, default_value_t = SchemeMode::Polyphone)]
    pub mode: SchemeMode,

    /// Minimum ready-line length admitted for simulation.
    #[arg(long, default_value_t = 2)]
    pub min_line_len: usize,

    /// Truncate derived codes to this length (0 = unconstrained, 1 rejected).
    #[arg(long, default_value_t = 0)]
    pub code_len: usize,

    /// Accumulate keystroke-interaction counters alongside accuracy.
    #[arg(long, default_value_t = false)]
    pub ergonomics: bool,

    /// JSON keyboard model for the ergonomic classifiers; standard ANSI
    /// assignment when omitted.
    #[arg(long)]
    pub keyboard: Option<String>,
}

impl BenchConfig {
    pub fn validate(&self) -> RbResult<()> {
        if self.code_len == 1 {
            return Err(RimeBenchError::InvalidCodeLength(1));
        }
        if self.min_line_len == 0 {
            return Err(RimeBenchError::Config(
                "--min-line-len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Artifact name shared by the supplementary ready/input pair; excluded from
/// the source corpus listing so a retry run never re-enters itself.
pub const SUPPLEMENTARY_FILE_NAME: &str = "sup.txt";

/// On-disk layout of one benchmark run under the data root.
#[derive(Debug, Clone)]
pub struct WorkDirs {
    pub root: PathBuf,
}

impl WorkDirs {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn articles(&self) -> PathBuf {
        self.root.join("articles")
    }

    pub fn charsets(&self) -> PathBuf {
        self.root.join("charsets")
    }

    pub fn articles_full(&self) -> PathBuf {
        self.root.join("articles_full")
    }

    pub fn articles_ready(&self) -> PathBuf {
        self.root.join("articles_ready")
    }

    pub fn input(&self) -> PathBuf {
        self.root.join("input")
    }

    pub fn output(&self) -> PathBuf {
        self.root.join("output")
    }

    pub fn unmatched(&self) -> PathBuf {
        self.root.join("unmatched_lines")
    }

    pub fn stats_file(&self) -> PathBuf {
        self.root.join("statistics.txt")
    }

    pub fn mapping_file(&self) -> PathBuf {
        self.root.join("mapping_table.txt")
    }

    pub fn mapping_sup_file(&self) -> PathBuf {
        self.root.join("mapping_sup.txt")
    }

    pub fn audit_file(&self) -> PathBuf {
        self.root.join("polyphone_audit.txt")
    }

    /// The source corpus, sorted for a stable processing order. An empty
    /// corpus is fatal.
    pub fn article_files(&self) -> RbResult<Vec<PathBuf>> {
        let dir = self.articles();
        let mut files: Vec<_> = fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n != SUPPLEMENTARY_FILE_NAME)
            })
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(RimeBenchError::MissingCorpus(dir));
        }
        Ok(files)
    }

    /// Create the per-run work directories and clear anything a previous run
    /// left behind, including the old statistics file.
    pub fn bootstrap(&self) -> RbResult<()> {
        for dir in [
            self.articles_full(),
            self.articles_ready(),
            self.input(),
            self.output(),
            self.unmatched(),
        ] {
            fs::create_dir_all(&dir)?;
            for entry in fs::read_dir(&dir)?.filter_map(|e| e.ok()) {
                if entry.path().is_file() {
                    fs::remove_file(entry.path())?;
                }
            }
        }
        for stale in [self.stats_file(), self.audit_file()] {
            if stale.exists() {
                fs::remove_file(stale)?;
            }
        }
        Ok(())
    }
}
