use crate::error::{RbResult, RimeBenchError};
use crate::mapping::{DisambigWord, MappingTable, PolyphoneTable};

/// Keystroke committing the current line in the console simulator.
pub const LINE_BREAK_KEY: &str = "1";
/// Keyword terminating a console session.
pub const SESSION_END: &str = "exit";

/// The encoded form of one article: one code line per ready line, each ending
/// with the line-break keystroke.
#[derive(Debug, Clone, Default)]
pub struct CodeStream {
    pub lines: Vec<String>,
}

impl CodeStream {
    /// The input artifact written next to the console's stdin, terminated by
    /// the session-end keyword like the stream the console actually consumes.
    pub fn to_artifact(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text.push('\n');
        text.push_str(SESSION_END);
        text.push('\n');
        text
    }
}

/// One recognized polyphone disambiguation, kept for the audit file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolyphoneMatch {
    pub file: String,
    pub line_no: usize,
    pub word: String,
    pub ch: char,
    pub code: String,
}

/// Turns ready lines into keystroke-code lines.
///
/// Without a polyphone table this is a straight per-character lookup; with
/// one, each position is disambiguated against the surrounding line before
/// falling back to the character's dominant code.
pub struct Encoder<'a> {
    mapping: &'a MappingTable,
    polyphones: Option<&'a PolyphoneTable>,
}

impl<'a> Encoder<'a> {
    pub fn new(mapping: &'a MappingTable) -> Self {
        Self {
            mapping,
            polyphones: None,
        }
    }

    pub fn with_polyphones(mapping: &'a MappingTable, polyphones: &'a PolyphoneTable) -> Self {
        Self {
            mapping,
            polyphones: Some(polyphones),
        }
    }

    /// Encode a whole article. `file` only labels audit records and errors.
    pub fn encode_article(
        &self,
        file: &str,
        ready_lines: &[String],
        audit: &mut Vec<PolyphoneMatch>,
    ) -> RbResult<CodeStream> {
        let mut stream = CodeStream::default();
        for (i, line) in ready_lines.iter().enumerate() {
            stream.lines.push(self.encode_line(file, i + 1, line, audit)?);
        }
        Ok(stream)
    }

    /// Encode one line, line-break keystroke appended.
    pub fn encode_line(
        &self,
        file: &str,
        line_no: usize,
        line: &str,
        audit: &mut Vec<PolyphoneMatch>,
    ) -> RbResult<String> {
        let chars: Vec<char> = line.chars().collect();
        let mut code_line = String::new();
        for (pos, &ch) in chars.iter().enumerate() {
            let code = match self.polyphones.and_then(|p| p.get(ch)) {
                Some(entry) => {
                    match self.match_in_context(&chars, pos, ch, &entry.words) {
                        Some(dw) => {
                            audit.push(PolyphoneMatch {
                                file: file.to_string(),
                                line_no,
                                word: dw.word.clone(),
                                ch,
                                code: dw.code.clone(),
                            });
                            dw.code.as_str()
                        }
                        // No context word covers this position.
                        None => entry.dominant.as_str(),
                    }
                }
                None => self
                    .mapping
                    .get(ch)
                    .ok_or_else(|| RimeBenchError::EncodingMiss {
                        ch,
                        file: file.to_string(),
                        line: line_no,
                    })?,
            };
            code_line.push_str(code);
        }
        code_line.push_str(LINE_BREAK_KEY);
        Ok(code_line)
    }

    /// Find the first disambiguating word (shortest first, as ordered in the
    /// table) with an occurrence in the line whose span covers `pos`.
    fn match_in_context<'w>(
        &self,
        chars: &[char],
        pos: usize,
        ch: char,
        words: &'w [DisambigWord],
    ) -> Option<&'w DisambigWord> {
        for dw in words {
            let word_chars: Vec<char> = dw.word.chars().collect();
            debug_assert!(word_chars.contains(&ch));
            if word_chars.len() > chars.len() {
                continue;
            }
            for start in 0..=(chars.len() - word_chars.len()) {
                if chars[start..start + word_chars.len()] == word_chars[..]
                    && pos >= start
                    && pos < start + word_chars.len()
                {
                    return Some(dw);
                }
            }
        }
        None
    }
}
