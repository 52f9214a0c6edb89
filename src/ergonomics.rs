use crate::error::RbResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Physical placement of one key in the code alphabet.
///
/// `hand`: 0 = left, 1 = right. `finger`: 0 = thumb .. 4 = pinky.
/// `row`: 0 = number row, 1 = top, 2 = home, 3 = bottom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeySlot {
    pub hand: u8,
    pub finger: u8,
    pub row: i8,
    pub col: i8,
}

/// Key → hand/finger/row table backing the keystroke classifiers. Loadable
/// from JSON so alternate physical layouts can be substituted without
/// touching the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyboardModel {
    pub keys: HashMap<char, KeySlot>,
}

impl KeyboardModel {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> RbResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// The standard ANSI touch-typing assignment over letters and digits.
    pub fn standard() -> Self {
        let mut keys = HashMap::new();
        let rows: [&str; 4] = ["1234567890", "qwertyuiop", "asdfghjkl;", "zxcvbnm,./"];
        for (row, chars) in rows.iter().enumerate() {
            for (col, c) in chars.chars().enumerate() {
                let hand = u8::from(col >= 5);
                let finger = match col {
                    0 | 9 => 4,
                    1 | 8 => 3,
                    2 | 7 => 2,
                    _ => 1,
                };
                keys.insert(
                    c,
                    KeySlot {
                        hand,
                        finger,
                        row: row as i8,
                        col: col as i8,
                    },
                );
            }
        }
        Self { keys }
    }

    pub fn slot(&self, c: char) -> Option<&KeySlot> {
        self.keys.get(&c)
    }
}

/// Counter bundle produced by one classification pass over a code line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StrokeCounts {
    pub same_finger: u64,
    pub little_finger: u64,
    pub row_jump_near: u64,
    pub row_jump_far: u64,
}

/// Pluggable keystroke-interaction scoring over a code line. Each counter is
/// a non-negative count for the given keystroke string; what exactly counts
/// as an interaction is the classifier's business, not the aggregator's.
pub trait StrokeClassifiers {
    fn classify(&self, code: &str) -> StrokeCounts;
}

/// Classifiers over a physical keyboard model, examining consecutive
/// keystroke pairs:
///
/// * same-finger: both strokes on one finger of one hand (repeats included);
/// * little-finger: one hand's pinky working against its ring neighbor;
/// * row jumps: a two-or-more row skip on one hand, *near* when the columns
///   stay adjacent and *far* otherwise. Same-finger pairs are claimed by the
///   same-finger counter alone.
pub struct ModelClassifiers<'a> {
    model: &'a KeyboardModel,
}

impl<'a> ModelClassifiers<'a> {
    pub fn new(model: &'a KeyboardModel) -> Self {
        Self { model }
    }
}

impl StrokeClassifiers for ModelClassifiers<'_> {
    fn classify(&self, code: &str) -> StrokeCounts {
        let mut counts = StrokeCounts::default();
        let slots: Vec<Option<&KeySlot>> =
            code.chars().map(|c| self.model.slot(c)).collect();

        for pair in slots.windows(2) {
            let (Some(a), Some(b)) = (pair[0], pair[1]) else {
                continue;
            };
            if a.hand != b.hand {
                continue;
            }
            if a.finger == b.finger {
                counts.same_finger += 1;
                continue;
            }
            if a.finger.min(b.finger) == 3 && a.finger.max(b.finger) == 4 {
                counts.little_finger += 1;
            }
            if (a.row - b.row).abs() >= 2 {
                if (a.col - b.col).abs() <= 1 {
                    counts.row_jump_near += 1;
                } else {
                    counts.row_jump_far += 1;
                }
            }
        }
        counts
    }
}
