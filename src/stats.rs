use crate::codegen::{CodeStream, LINE_BREAK_KEY};
use crate::driver::SupplementaryResult;
use crate::engine::CommitLine;
use crate::ergonomics::{StrokeClassifiers, StrokeCounts};
use crate::error::{RbResult, RimeBenchError};

/// Raw counters for one article (or the grand total). Only sums are ever
/// accumulated; percentages and averages are derived at report time so
/// rounding never compounds across files.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AccuracyStats {
    pub lines: u64,
    pub lines_correct: u64,
    pub chars: u64,
    pub chars_correct: u64,

    // Keystroke-side counters, filled by the ergonomics pass.
    pub source_chars: u64,
    pub code_units: u64,
    pub same_finger: u64,
    pub little_finger: u64,
    pub row_jump_near: u64,
    pub row_jump_far: u64,
}

impl AccuracyStats {
    /// Fold another article's counters into this accumulator.
    pub fn absorb(&mut self, other: &AccuracyStats) {
        self.lines += other.lines;
        self.lines_correct += other.lines_correct;
        self.chars += other.chars;
        self.chars_correct += other.chars_correct;
        self.source_chars += other.source_chars;
        self.code_units += other.code_units;
        self.same_finger += other.same_finger;
        self.little_finger += other.little_finger;
        self.row_jump_near += other.row_jump_near;
        self.row_jump_far += other.row_jump_far;
    }

    pub fn line_accuracy(&self) -> f64 {
        ratio(self.lines_correct, self.lines)
    }

    pub fn char_accuracy(&self) -> f64 {
        ratio(self.chars_correct, self.chars)
    }

    /// Keystrokes per source character.
    pub fn avg_code_len(&self) -> f64 {
        if self.source_chars == 0 {
            0.0
        } else {
            self.code_units as f64 / self.source_chars as f64
        }
    }

    pub fn rate_per_char(&self, counter: u64) -> f64 {
        ratio(counter, self.source_chars)
    }

    pub fn rate_per_stroke(&self, counter: u64) -> f64 {
        ratio(counter, self.code_units)
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// An input/committed pair that stayed wrong after every recovery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedLine {
    pub input: String,
    pub output: String,
}

/// Align ready lines with commit lines and count accuracy.
///
/// The two slices must be the same length; a mismatch signals a corrupted
/// run and is fatal, never silently truncated. Empty ready lines are skipped
/// entirely. A corrupted commit with a recovered supplementary result is
/// scored against that recovery instead of the garbled text.
pub fn score(
    label: &str,
    ready_lines: &[String],
    commits: &[CommitLine],
    sup: &SupplementaryResult,
) -> RbResult<(AccuracyStats, Vec<UnmatchedLine>)> {
    if ready_lines.len() != commits.len() {
        return Err(RimeBenchError::LineCountMismatch {
            label: label.to_string(),
            input: ready_lines.len(),
            output: commits.len(),
        });
    }

    let mut stats = AccuracyStats::default();
    let mut unmatched = Vec::new();

    for (ready, commit) in ready_lines.iter().zip(commits) {
        if ready.is_empty() {
            continue;
        }
        let ready_len = ready.chars().count() as u64;
        stats.lines += 1;
        stats.chars += ready_len;

        if *ready == commit.text {
            stats.lines_correct += 1;
            stats.chars_correct += ready_len;
        } else if commit.corrupted && sup.contains_key(ready) {
            let recovered = &sup[ready];
            if ready == recovered {
                stats.lines_correct += 1;
                stats.chars_correct += ready_len;
            } else {
                stats.chars_correct += positional_matches(ready, recovered);
            }
        } else {
            stats.chars_correct += positional_matches(ready, &commit.text);
            unmatched.push(UnmatchedLine {
                input: ready.clone(),
                output: commit.text.clone(),
            });
        }
    }

    Ok((stats, unmatched))
}

/// Position-wise character equality up to the shorter string's length.
fn positional_matches(a: &str, b: &str) -> u64 {
    a.chars().zip(b.chars()).filter(|(x, y)| x == y).count() as u64
}

/// Count source characters and code units for the encoded stream. The
/// trailing line-break keystroke is stripped once per line and excluded from
/// the code-unit total.
pub fn accumulate_code_lengths(
    stats: &mut AccuracyStats,
    ready_lines: &[String],
    stream: &CodeStream,
) {
    for ready in ready_lines {
        stats.source_chars += ready.chars().count() as u64;
    }
    for code_line in &stream.lines {
        let code = code_line.strip_suffix(LINE_BREAK_KEY).unwrap_or(code_line);
        stats.code_units += code.chars().count() as u64;
    }
}

/// Accumulate the keystroke-interaction counters. Classification sees each
/// code line with its trailing line-break keystroke stripped, the same view
/// the code-unit count uses.
pub fn accumulate_keystrokes<C: StrokeClassifiers + ?Sized>(
    stats: &mut AccuracyStats,
    stream: &CodeStream,
    classifiers: &C,
) {
    for code_line in &stream.lines {
        let code = code_line.strip_suffix(LINE_BREAK_KEY).unwrap_or(code_line);
        let StrokeCounts {
            same_finger,
            little_finger,
            row_jump_near,
            row_jump_far,
        } = classifiers.classify(code);
        stats.same_finger += same_finger;
        stats.little_finger += little_finger;
        stats.row_jump_near += row_jump_near;
        stats.row_jump_far += row_jump_far;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ergonomics::{KeyboardModel, ModelClassifiers};

    fn commit(text: &str) -> CommitLine {
        CommitLine::new(text)
    }

    fn break_key_stream() -> CodeStream {
        // The second code genuinely ends in the break-key digit: stripping
        // must remove only the final keystroke, leaving "z1".
        CodeStream {
            lines: vec!["fr1".to_string(), "z11".to_string()],
        }
    }

    #[test]
    fn code_lengths_exclude_one_line_break_keystroke_per_line() {
        let ready = vec!["春天".to_string()];
        let mut s = AccuracyStats::default();
        accumulate_code_lengths(&mut s, &ready, &break_key_stream());
        assert_eq!(s.source_chars, 2);
        // "fr" plus "z1".
        assert_eq!(s.code_units, 4);
    }

    #[test]
    fn classifiers_see_the_stripped_code() {
        let model = KeyboardModel::standard();
        let cls = ModelClassifiers::new(&model);
        let mut s = AccuracyStats::default();
        accumulate_keystrokes(&mut s, &break_key_stream(), &cls);
        // f/r share the left index finger; z and the literal 1 keystroke
        // share the left pinky. The pair against the trailing break key
        // never reaches the classifier.
        assert_eq!(s.same_finger, 2);
        assert_eq!(s.code_units, 0);
    }

    #[test]
    fn exact_match_gets_full_credit() {
        let ready = vec!["春天来了".to_string()];
        let commits = vec![commit("春天来了")];
        let (stats, unmatched) =
            score("t", &ready, &commits, &SupplementaryResult::new()).unwrap();
        assert_eq!(stats.lines, 1);
        assert_eq!(stats.lines_correct, 1);
        assert_eq!(stats.chars, 4);
        assert_eq!(stats.chars_correct, 4);
        assert!(unmatched.is_empty());
    }

    #[test]
    fn empty_ready_line_is_never_counted() {
        let ready = vec![String::new()];
        let commits = vec![commit("whatever")];
        let (stats, _) = score("t", &ready, &commits, &SupplementaryResult::new()).unwrap();
        assert_eq!(stats.lines, 0);
        assert_eq!(stats.chars, 0);
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let ready = vec!["春".to_string(), "天".to_string()];
        let commits = vec![commit("春")];
        let err = score("t", &ready, &commits, &SupplementaryResult::new()).unwrap_err();
        assert!(matches!(
            err,
            RimeBenchError::LineCountMismatch {
                input: 2,
                output: 1,
                ..
            }
        ));
    }

    #[test]
    fn mismatch_scores_positionally_and_records_unmatched() {
        let ready = vec!["春天来了".to_string()];
        let commits = vec![commit("春地来")];
        let (stats, unmatched) =
            score("t", &ready, &commits, &SupplementaryResult::new()).unwrap();
        assert_eq!(stats.lines_correct, 0);
        // Positions 0 and 2 agree; position 3 is out of range on the output.
        assert_eq!(stats.chars_correct, 2);
        assert_eq!(unmatched.len(), 1);
        assert_eq!(unmatched[0].input, "春天来了");
        assert_eq!(unmatched[0].output, "春地来");
    }

    #[test]
    fn corrupted_line_uses_recovered_text() {
        let ready = vec!["春天来了".to_string()];
        let commits = vec![commit("春\u{FFFD}来了")];
        let mut sup = SupplementaryResult::new();
        sup.insert("春天来了".to_string(), "春天来了".to_string());
        let (stats, unmatched) = score("t", &ready, &commits, &sup).unwrap();
        assert_eq!(stats.lines_correct, 1);
        assert_eq!(stats.chars_correct, 4);
        assert!(unmatched.is_empty());
    }

    #[test]
    fn partially_recovered_line_scores_against_recovery() {
        let ready = vec!["春天来了".to_string()];
        let commits = vec![commit("春\u{FFFD}来了")];
        let mut sup = SupplementaryResult::new();
        sup.insert("春天来了".to_string(), "春地来了".to_string());
        let (stats, unmatched) = score("t", &ready, &commits, &sup).unwrap();
        assert_eq!(stats.lines_correct, 0);
        assert_eq!(stats.chars_correct, 3);
        // Recovered-but-wrong lines are not re-audited as unmatched.
        assert!(unmatched.is_empty());
    }

    #[test]
    fn totals_are_pure_sums() {
        let mut total = AccuracyStats::default();
        let a = AccuracyStats {
            lines: 2,
            lines_correct: 1,
            chars: 10,
            chars_correct: 8,
            ..Default::default()
        };
        let b = AccuracyStats {
            lines: 3,
            lines_correct: 3,
            chars: 12,
            chars_correct: 12,
            ..Default::default()
        };
        total.absorb(&a);
        total.absorb(&b);
        assert_eq!(total.lines, 5);
        assert_eq!(total.lines_correct, 4);
        assert_eq!(total.chars, 22);
        assert_eq!(total.chars_correct, 20);
        assert!((total.line_accuracy() - 80.0).abs() < 1e-9);
    }
}
