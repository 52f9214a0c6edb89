use crate::error::{RbResult, RimeBenchError};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Character → primary code. Built once per run, read-only thereafter.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    codes: HashMap<char, String>,
}

impl MappingTable {
    pub fn get(&self, c: char) -> Option<&str> {
        self.codes.get(&c).map(String::as_str)
    }

    pub fn contains(&self, c: char) -> bool {
        self.codes.contains_key(&c)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn insert(&mut self, c: char, code: String) {
        self.codes.insert(c, code);
    }

    /// Tab-separated `char<TAB>code` artifact, sorted by character so repeated
    /// generation on the same dictionary is byte-identical.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> RbResult<()> {
        let sorted: BTreeMap<_, _> = self.codes.iter().collect();
        let mut out = File::create(path)?;
        for (ch, code) in sorted {
            writeln!(out, "{ch}\t{code}")?;
        }
        Ok(())
    }
}

/// One context word disambiguating a polyphone reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisambigWord {
    pub word: String,
    pub code: String,
}

/// Non-dominant readings of a character, with the words that select them.
/// Words are ordered shortest-first (ties lexicographic) so the encoder can
/// fall back from long contexts to short ones deterministically.
#[derive(Debug, Clone, Default)]
pub struct PolyphoneEntry {
    pub dominant: String,
    pub words: Vec<DisambigWord>,
}

#[derive(Debug, Clone, Default)]
pub struct PolyphoneTable {
    entries: HashMap<char, PolyphoneEntry>,
}

impl PolyphoneTable {
    pub fn get(&self, c: char) -> Option<&PolyphoneEntry> {
        self.entries.get(&c)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, c: char, entry: PolyphoneEntry) {
        self.entries.insert(c, entry);
    }

    /// Tab-separated `char<TAB>code<TAB>word,word,...` artifact, one row per
    /// (character, non-dominant code) group, byte-stable across runs.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> RbResult<()> {
        let mut rows: BTreeMap<(char, String), Vec<String>> = BTreeMap::new();
        for (&ch, entry) in &self.entries {
            for dw in &entry.words {
                rows.entry((ch, dw.code.clone()))
                    .or_default()
                    .push(dw.word.clone());
            }
        }
        let mut out = File::create(path)?;
        for ((ch, code), words) in rows {
            writeln!(out, "{ch}\t{code}\t{}", words.join(","))?;
        }
        Ok(())
    }
}

/// Load a pre-built `char<TAB>code` mapping table. Duplicate characters
/// overwrite; malformed rows are skipped, not fatal.
pub fn load_direct<P: AsRef<Path>>(path: P) -> RbResult<MappingTable> {
    let file = File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(file);

    let mut table = MappingTable::default();
    let mut skipped = 0usize;
    for result in rdr.records() {
        let Ok(rec) = result else {
            skipped += 1;
            continue;
        };
        if rec.len() < 2 {
            skipped += 1;
            continue;
        }
        let mut chars = rec[0].trim().chars();
        let (Some(ch), None) = (chars.next(), chars.next()) else {
            skipped += 1;
            continue;
        };
        let code = rec[1].trim();
        if code.is_empty() {
            skipped += 1;
            continue;
        }
        table.insert(ch, code.to_string());
    }
    if skipped > 0 {
        debug!("Mapping table: skipped {} malformed rows", skipped);
    }
    info!("Mapping table loaded: {} characters", table.len());
    Ok(table)
}

/// Derive the mapping and polyphone tables from a directory of dictionary
/// files (`*.dict.yaml`, tab-separated `word<TAB>code-sequence` records).
///
/// Single-character entries contribute candidate codes directly. Each
/// multi-character word contributes one (word, code) pair per character
/// position, but only when the code sequence splits into exactly as many
/// space-separated codes as the word has characters, and the word carries no
/// internal separator. A character's dominant code is the candidate used by
/// the most distinct words; ties go to the lexicographically smallest code.
/// Words whose per-character code differs from the dominant one become
/// polyphone disambiguation entries.
///
/// `len_code` truncates every candidate code before voting; 0 means
/// unconstrained, 1 is rejected before any file I/O.
pub fn build_derived<P: AsRef<Path>>(
    dict_dir: P,
    len_code: usize,
) -> RbResult<(MappingTable, PolyphoneTable)> {
    if len_code == 1 {
        return Err(RimeBenchError::InvalidCodeLength(len_code));
    }

    let mut files: Vec<_> = fs::read_dir(dict_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".dict.yaml"))
        })
        .collect();
    files.sort();

    let trim_code = |code: &str| -> String {
        if len_code > 0 {
            code.chars().take(len_code).collect()
        } else {
            code.to_string()
        }
    };

    // Candidate single-character codes, and per-character word→code pairs.
    let mut singles: BTreeMap<char, BTreeSet<String>> = BTreeMap::new();
    let mut word_codes: BTreeMap<char, BTreeMap<String, String>> = BTreeMap::new();

    for path in &files {
        let file = File::open(path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(file);

        for result in rdr.records() {
            let Ok(rec) = result else { continue };
            if rec.len() < 2 {
                continue;
            }
            let word = rec[0].trim();
            let codes = rec[1].trim();
            if word.is_empty() || codes.is_empty() {
                continue;
            }

            let word_chars: Vec<char> = word.chars().collect();
            if word_chars.len() == 1 {
                singles
                    .entry(word_chars[0])
                    .or_default()
                    .insert(trim_code(codes));
                continue;
            }

            // Alignment invariant: one space-separated code per character.
            if !codes.contains(' ') || word.contains(',') {
                continue;
            }
            let code_list: Vec<&str> = codes.split(' ').collect();
            if code_list.len() != word_chars.len() {
                continue;
            }
            for (i, &ch) in word_chars.iter().enumerate() {
                word_codes
                    .entry(ch)
                    .or_default()
                    .insert(word.to_string(), trim_code(code_list[i]));
            }
        }
    }

    // Vote: per character, count distinct words behind each candidate code.
    let mut dominant: BTreeMap<char, String> = BTreeMap::new();
    for (&ch, words) in &word_codes {
        let mut votes: BTreeMap<&str, usize> = BTreeMap::new();
        for code in words.values() {
            *votes.entry(code.as_str()).or_default() += 1;
        }
        let mut best: Option<(&str, usize)> = None;
        for (code, n) in votes {
            // Strictly-greater keeps the lexicographically smallest code on ties.
            if best.map_or(true, |(_, m)| n > m) {
                best = Some((code, n));
            }
        }
        if let Some((code, _)) = best {
            dominant.insert(ch, code.to_string());
        }
    }

    // Assemble the mapping: dominant codes validated against single-character
    // entries first, then any remaining single-entry characters.
    let mut table = MappingTable::default();
    let mut dominant_mapped: BTreeSet<char> = BTreeSet::new();
    for (&ch, code) in &dominant {
        if singles.get(&ch).is_some_and(|set| set.contains(code)) {
            table.insert(ch, code.clone());
            dominant_mapped.insert(ch);
        }
    }
    for (&ch, codes) in &singles {
        if !dominant_mapped.contains(&ch) {
            if let Some(code) = codes.iter().next() {
                table.insert(ch, code.clone());
            }
        }
    }

    // Every word disagreeing with its character's dominant code becomes a
    // disambiguation entry, shortest word first.
    let mut polyphones = PolyphoneTable::default();
    for &ch in &dominant_mapped {
        let dom = &dominant[&ch];
        let mut words: Vec<DisambigWord> = word_codes[&ch]
            .iter()
            .filter(|(_, code)| code.as_str() != dom.as_str())
            .map(|(word, code)| DisambigWord {
                word: word.clone(),
                code: code.clone(),
            })
            .collect();
        if words.is_empty() {
            continue;
        }
        words.sort_by(|a, b| {
            a.word
                .chars()
                .count()
                .cmp(&b.word.chars().count())
                .then_with(|| a.word.cmp(&b.word))
        });
        polyphones.insert(
            ch,
            PolyphoneEntry {
                dominant: dom.clone(),
                words,
            },
        );
    }

    info!(
        "Derived tables: {} mapped characters, {} polyphones ({} dictionary files)",
        table.len(),
        polyphones.len(),
        files.len()
    );
    Ok((table, polyphones))
}
