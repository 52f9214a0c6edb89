use crate::codegen::CodeStream;
use crate::engine::{CommitLine, EngineConsole};
use crate::error::{RbResult, RimeBenchError};
use std::collections::HashMap;
use tracing::{debug, warn};

/// The one-shot retry set: ready lines whose first-pass commit came back
/// corrupted, paired positionally with their original code lines.
#[derive(Debug, Clone, Default)]
pub struct SupplementaryBatch {
    pub ready_lines: Vec<String>,
    pub code_lines: Vec<String>,
}

impl SupplementaryBatch {
    pub fn is_empty(&self) -> bool {
        self.ready_lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ready_lines.len()
    }
}

/// Final committed text per originally-corrupted ready line, built from the
/// supplementary pass and consulted during scoring.
pub type SupplementaryResult = HashMap<String, String>;

/// Runs the two-pass simulate/retry protocol. First passes (one per article)
/// collect corrupted lines into the supplementary batch; the single final
/// pass replays that batch once, with no further retry, so the engine is
/// invoked at most twice per corpus.
///
/// Commit line *i* always corresponds to code line *i*; that positional join
/// is the only key used for retry selection and scoring.
pub struct SimulationDriver<'a, E: EngineConsole + ?Sized> {
    engine: &'a E,
    batch: SupplementaryBatch,
}

impl<'a, E: EngineConsole + ?Sized> SimulationDriver<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self {
            engine,
            batch: SupplementaryBatch::default(),
        }
    }

    pub fn batch(&self) -> &SupplementaryBatch {
        &self.batch
    }

    /// Simulate one article. Corrupted commits are queued for the final pass;
    /// the full commit log is returned for scoring either way.
    ///
    /// `ready_lines` and `stream` must pair up positionally; a length
    /// mismatch is rejected before the engine is invoked.
    pub fn run_first_pass(
        &mut self,
        label: &str,
        ready_lines: &[String],
        stream: &CodeStream,
    ) -> RbResult<Vec<CommitLine>> {
        if ready_lines.len() != stream.lines.len() {
            return Err(RimeBenchError::LineCountMismatch {
                label: label.to_string(),
                input: ready_lines.len(),
                output: stream.lines.len(),
            });
        }
        let commits = self.engine.submit(&stream.lines, label)?;
        if commits.len() != stream.lines.len() {
            return Err(RimeBenchError::LineCountMismatch {
                label: label.to_string(),
                input: stream.lines.len(),
                output: commits.len(),
            });
        }

        let corrupted: Vec<usize> = commits
            .iter()
            .enumerate()
            .filter(|(_, c)| c.corrupted)
            .map(|(i, _)| i + 1)
            .collect();
        if !corrupted.is_empty() {
            debug!(
                "'{}': {} corrupted commit lines queued for retry",
                label,
                corrupted.len()
            );
            for &n in &corrupted {
                self.batch.ready_lines.push(ready_lines[n - 1].clone());
                self.batch.code_lines.push(stream.lines[n - 1].clone());
            }
        }
        Ok(commits)
    }

    /// Replay the accumulated batch once. Lines still corrupted afterwards
    /// are only warned about; they will simply score as incorrect.
    pub fn run_final_pass(&mut self) -> RbResult<SupplementaryResult> {
        if self.batch.is_empty() {
            return Ok(SupplementaryResult::new());
        }
        let label = "supplementary";
        let commits = self.engine.submit(&self.batch.code_lines, label)?;
        if commits.len() != self.batch.ready_lines.len() {
            return Err(RimeBenchError::LineCountMismatch {
                label: label.to_string(),
                input: self.batch.ready_lines.len(),
                output: commits.len(),
            });
        }

        let residual = commits.iter().filter(|c| c.corrupted).count();
        if residual > 0 {
            warn!("{} corrupted lines remain after the retry pass", residual);
        }

        let mut result = SupplementaryResult::new();
        for (ready, commit) in self.batch.ready_lines.iter().zip(&commits) {
            if !ready.is_empty() {
                result.insert(ready.clone(), commit.text.clone());
            }
        }
        Ok(result)
    }
}
