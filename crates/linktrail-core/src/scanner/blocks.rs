//! Forward scan over transcript lines for fetch-tool invocation blocks.
//!
//! A block opens on a `<tool-use ... data-tool-name="<tool>">` line and closes
//! on the first following line containing `</tool-use>`. Only lines inside
//! triple-backtick fences are captured as result content; fence lines
//! themselves never are. Blocks that never close produce nothing and are
//! counted in [`BlockScanner::unterminated_blocks`].

use regex::Regex;

pub const TOOL_USE_END: &str = "</tool-use>";
pub const TOOL_USE_OPEN: &str = "<tool-use";
const FENCE: &str = "```";

/// Case-insensitive regex for the opening tag of a tool-use block.
pub fn tool_start_regex(tool_name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r#"(?i)<tool-use[^>]*data-tool-name="{}"[^>]*>"#,
        regex::escape(tool_name)
    ))
}

/// Dot-all regex matching a whole tool-use span for `tool_name`.
pub fn tool_span_regex(tool_name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r#"(?s)<tool-use[^>]*data-tool-name="{}"[^>]*>.*?</tool-use>"#,
        regex::escape(tool_name)
    ))
}

/// `true` for lines that open or close a tool-use span.
pub fn is_tool_tag_line(line: &str) -> bool {
    line.contains(TOOL_USE_OPEN) || line.contains(TOOL_USE_END)
}

// ---------------------------------------------------------------------------
// Block types
// ---------------------------------------------------------------------------

/// One closed fetch-tool block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolBlock {
    /// 1-based line number of the opening tag.
    pub start_line: usize,
    /// 0-based index of the closing-tag line.
    pub end_index: usize,
    /// Fenced content inside the block, joined and trimmed.
    pub content: String,
}

/// A block together with the lines that precede it.
#[derive(Clone, Debug)]
pub struct ScannedBlock<'a> {
    pub block: ToolBlock,
    pub context: &'a [&'a str],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    OutsideBlock,
    InBlockText,
    InBlockFenced,
}

impl ScanState {
    /// Transition for one line inside a block (the closing tag is handled by
    /// the caller). Returns the next state and whether `line` is content.
    pub fn step(self, line: &str) -> (ScanState, bool) {
        let is_fence = line.trim().starts_with(FENCE);
        match (self, is_fence) {
            (ScanState::InBlockText, true) => (ScanState::InBlockFenced, false),
            (ScanState::InBlockFenced, true) => (ScanState::InBlockText, false),
            (ScanState::InBlockFenced, false) => (ScanState::InBlockFenced, true),
            (state, _) => (state, false),
        }
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Single-pass iterator over the fetch blocks of one transcript.
pub struct BlockScanner<'a> {
    lines: &'a [&'a str],
    start_re: Regex,
    lookback: usize,
    cursor: usize,
    unterminated: usize,
}

impl<'a> BlockScanner<'a> {
    pub fn new(lines: &'a [&'a str], tool_name: &str, lookback: usize) -> Result<Self, regex::Error> {
        Ok(Self::from_regex(lines, tool_start_regex(tool_name)?, lookback))
    }

    /// Scanner over `lines` using an already compiled start-marker regex.
    pub fn from_regex(lines: &'a [&'a str], start_re: Regex, lookback: usize) -> Self {
        Self {
            lines,
            start_re,
            lookback,
            cursor: 0,
            unterminated: 0,
        }
    }

    /// Blocks opened but never closed so far.
    pub fn unterminated_blocks(&self) -> usize {
        self.unterminated
    }

    fn emit(&self, start: usize, end: usize, buffer: &[&str]) -> ScannedBlock<'a> {
        let context_start = start.saturating_sub(self.lookback);
        ScannedBlock {
            block: ToolBlock {
                start_line: start + 1,
                end_index: end,
                content: buffer.join("\n").trim().to_string(),
            },
            context: &self.lines[context_start..start],
        }
    }
}

impl<'a> Iterator for BlockScanner<'a> {
    type Item = ScannedBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut state = ScanState::OutsideBlock;
        let mut start = 0;
        let mut buffer: Vec<&'a str> = Vec::new();

        while self.cursor < self.lines.len() {
            let index = self.cursor;
            let line = self.lines[index];
            self.cursor += 1;

            match state {
                ScanState::OutsideBlock => {
                    if self.start_re.is_match(line) {
                        start = index;
                        state = ScanState::InBlockText;
                    }
                }
                ScanState::InBlockText | ScanState::InBlockFenced => {
                    if line.contains(TOOL_USE_END) {
                        return Some(self.emit(start, index, &buffer));
                    }
                    let (next, captured) = state.step(line);
                    if captured {
                        buffer.push(line);
                    }
                    state = next;
                }
            }
        }

        if state != ScanState::OutsideBlock {
            self.unterminated += 1;
        }
        None
    }
}
