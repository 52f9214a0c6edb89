use crate::charset::Charset;
use crate::mapping::MappingTable;

/// Line-structured views of one source article.
///
/// `full_lines` holds every maximal run of charset characters, one line per
/// interruption in the source. `ready_lines` keeps only the lines every
/// downstream stage can handle: fully mapped and at least `min_line_len`
/// characters long.
#[derive(Debug, Clone, Default)]
pub struct SegmentedArticle {
    pub full_lines: Vec<String>,
    pub ready_lines: Vec<String>,
}

impl SegmentedArticle {
    /// The pre-filtered artifact: every charset run, trailing newline kept.
    pub fn full_text(&self) -> String {
        let mut text = self.full_lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }

    /// The ready artifact fed to encoding.
    pub fn ready_text(&self) -> String {
        let mut text = self.ready_lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }
}

/// Scan `raw` character by character. Charset members extend the pending
/// line; anything else (or end of input) closes it. A closed line is admitted
/// to `ready_lines` only when every character has a mapping entry and the
/// line is long enough; it always lands in `full_lines`.
pub fn segment(
    raw: &str,
    charset: &Charset,
    mapped: &MappingTable,
    min_line_len: usize,
) -> SegmentedArticle {
    let mut article = SegmentedArticle::default();
    let mut buffer = String::new();
    let mut buffer_len = 0usize;

    let mut close = |buffer: &mut String, buffer_len: &mut usize, article: &mut SegmentedArticle| {
        if buffer.is_empty() {
            return;
        }
        if *buffer_len >= min_line_len && buffer.chars().all(|c| mapped.contains(c)) {
            article.ready_lines.push(buffer.clone());
        }
        article.full_lines.push(std::mem::take(buffer));
        *buffer_len = 0;
    };

    for c in raw.chars() {
        if charset.contains(c) {
            buffer.push(c);
            buffer_len += 1;
        } else {
            close(&mut buffer, &mut buffer_len, &mut article);
        }
    }
    close(&mut buffer, &mut buffer_len, &mut article);

    article
}
