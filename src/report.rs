use crate::codegen::PolyphoneMatch;
use crate::error::RbResult;
use crate::stats::{AccuracyStats, UnmatchedLine};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends one section per article (plus a grand-total section) to the
/// cumulative statistics file. Ratios are computed here, from the summed
/// counters, and nowhere else.
pub struct ReportWriter {
    path: PathBuf,
    ergonomics: bool,
}

impl ReportWriter {
    pub fn new<P: AsRef<Path>>(path: P, ergonomics: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ergonomics,
        }
    }

    /// `label` names the article; `None` writes the grand-total header.
    pub fn append_section(&self, label: Option<&str>, stats: &AccuracyStats) -> RbResult<()> {
        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        match label {
            Some(name) => writeln!(out, "--- {name} ---")?,
            None => writeln!(out, "\n===== all articles =====")?,
        }
        writeln!(
            out,
            "lines total, correct, accuracy:\t{}, {}, {:.2}%",
            stats.lines,
            stats.lines_correct,
            stats.line_accuracy()
        )?;
        writeln!(
            out,
            "chars total, correct, accuracy:\t{}, {}, {:.2}%",
            stats.chars,
            stats.chars_correct,
            stats.char_accuracy()
        )?;

        writeln!(
            out,
            "keystrokes, chars typed, avg code length:\t{}, {}, {:.4}",
            stats.code_units,
            stats.source_chars,
            stats.avg_code_len()
        )?;

        if self.ergonomics {
            for (name, counter) in [
                ("same-finger", stats.same_finger),
                ("little-finger", stats.little_finger),
                ("row-jump near", stats.row_jump_near),
                ("row-jump far", stats.row_jump_far),
            ] {
                writeln!(
                    out,
                    "{name}:\t{counter} ({:.2}% per char, {:.2}% per stroke)",
                    stats.rate_per_char(counter),
                    stats.rate_per_stroke(counter)
                )?;
            }
        }
        Ok(())
    }
}

/// Tab-separated original/committed pairs, written only when mismatches
/// exist for the article.
pub fn write_unmatched<P: AsRef<Path>>(path: P, lines: &[UnmatchedLine]) -> RbResult<()> {
    if lines.is_empty() {
        return Ok(());
    }
    let mut out = File::create(path)?;
    for l in lines {
        writeln!(out, "{}\t{}", l.input, l.output)?;
    }
    Ok(())
}

/// Audit trail of every recognized polyphone disambiguation.
pub fn write_audit<P: AsRef<Path>>(path: P, matches: &[PolyphoneMatch]) -> RbResult<()> {
    if matches.is_empty() {
        return Ok(());
    }
    let mut out = File::create(path)?;
    for m in matches {
        writeln!(
            out,
            "{}\t{}\t{}\t{}:{}",
            m.file, m.line_no, m.word, m.ch, m.code
        )?;
    }
    Ok(())
}
