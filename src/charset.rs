use crate::error::RbResult;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// The hanzi symbol zone misfiles this character; every canonical list we
/// consume treats it as a symbol, but schemes type it as a regular character.
const EXTRA_CHARS: &[char] = &['〇'];

/// Membership filter for "in-scheme" text, built once from one or more
/// canonical character-list files. Immutable after load.
#[derive(Debug, Clone, Default)]
pub struct Charset {
    chars: HashSet<char>,
}

impl Charset {
    /// Union the characters of every listed file, whitespace stripped.
    /// A missing file is fatal.
    pub fn load<P: AsRef<Path>>(files: &[P]) -> RbResult<Self> {
        let mut chars = HashSet::new();
        for file in files {
            let content = fs::read_to_string(file)?;
            chars.extend(content.chars().filter(|c| !c.is_whitespace()));
        }
        chars.extend(EXTRA_CHARS.iter().copied());
        debug!("Charset loaded: {} characters", chars.len());
        Ok(Self { chars })
    }

    /// Load every `.txt` file found directly under `dir`.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> RbResult<Self> {
        let mut files: Vec<_> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        files.sort();
        Self::load(&files)
    }

    pub fn from_chars<I: IntoIterator<Item = char>>(chars: I) -> Self {
        Self {
            chars: chars.into_iter().collect(),
        }
    }

    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(&c)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn unions_files_and_strips_whitespace() {
        let mut f1 = NamedTempFile::new().unwrap();
        let mut f2 = NamedTempFile::new().unwrap();
        write!(f1, "大 小\n中").unwrap();
        write!(f2, "中\t文\r\n").unwrap();

        let cs = Charset::load(&[f1.path(), f2.path()]).unwrap();
        for c in ['大', '小', '中', '文'] {
            assert!(cs.contains(c), "missing {c}");
        }
        assert!(!cs.contains(' '));
        assert!(!cs.contains('\n'));
    }

    #[test]
    fn carries_fixed_exception_characters() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "大").unwrap();
        let cs = Charset::load(&[f.path()]).unwrap();
        assert!(cs.contains('〇'));
    }

    #[test]
    fn reload_is_idempotent() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "重庆要").unwrap();
        let a = Charset::load(&[f.path()]).unwrap();
        let b = Charset::load(&[f.path()]).unwrap();
        assert_eq!(a.len(), b.len());
        for c in "重庆要".chars() {
            assert!(a.contains(c) && b.contains(c));
        }
    }

    #[test]
    fn missing_file_is_fatal() {
        assert!(Charset::load(&["/nonexistent/charset.txt"]).is_err());
    }
}
