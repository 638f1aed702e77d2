//! Single-pass tokenizer over byte buffers and text.
//!
//! Exactly four input units are structural: space (token boundary), slash
//! (token boundary, position recorded), line feed (line complete) and
//! carriage return (dropped). Everything else, tabs included, is literal
//! token content. Byte and text input must tokenize identically for ASCII
//! content.

use crate::error::ParseResult;

/// Token and slash accumulator for the line currently being scanned.
///
/// Buffers are reused across lines; `reset` is called after every emitted
/// line, which also clears the slash positions.
#[derive(Debug, Default)]
struct LineAccumulator {
    tokens: Vec<String>,
    slashes: Vec<usize>,
    word: String,
}

impl LineAccumulator {
    fn boundary(&mut self) {
        if !self.word.is_empty() {
            self.tokens.push(std::mem::take(&mut self.word));
        }
    }

    fn slash(&mut self, position: usize) {
        self.slashes.push(position);
        self.boundary();
    }

    fn reset(&mut self) {
        self.tokens.clear();
        self.slashes.clear();
    }
}

/// Scans a byte buffer, one byte per character code, invoking `on_line` for
/// every non-empty logical line. A final line without a terminator is still
/// emitted.
pub(crate) fn scan_bytes<F>(input: &[u8], mut on_line: F) -> ParseResult<()>
where
    F: FnMut(&[String], &[usize]) -> ParseResult<()>,
{
    let mut line = LineAccumulator::default();
    for (position, &code) in input.iter().enumerate() {
        match code {
            b' ' => line.boundary(),
            b'/' => line.slash(position),
            b'\n' => {
                line.boundary();
                if !line.tokens.is_empty() {
                    on_line(&line.tokens, &line.slashes)?;
                }
                line.reset();
            }
            b'\r' => {}
            other => line.word.push(other as char),
        }
    }
    line.boundary();
    if !line.tokens.is_empty() {
        on_line(&line.tokens, &line.slashes)?;
    }
    Ok(())
}

/// Scans a text string with the same grammar as [`scan_bytes`].
pub(crate) fn scan_text<F>(input: &str, mut on_line: F) -> ParseResult<()>
where
    F: FnMut(&[String], &[usize]) -> ParseResult<()>,
{
    let mut line = LineAccumulator::default();
    for (position, ch) in input.chars().enumerate() {
        match ch {
            ' ' => line.boundary(),
            '/' => line.slash(position),
            '\n' => {
                line.boundary();
                if !line.tokens.is_empty() {
                    on_line(&line.tokens, &line.slashes)?;
                }
                line.reset();
            }
            '\r' => {}
            other => line.word.push(other),
        }
    }
    line.boundary();
    if !line.tokens.is_empty() {
        on_line(&line.tokens, &line.slashes)?;
    }
    Ok(())
}
