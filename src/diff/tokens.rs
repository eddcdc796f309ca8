// Tokenization for diffing. Offsets are in characters, not bytes, so that
// operations line up with what a reader sees regardless of encoding.

use super::Granularity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub text: &'a str,
    /// Character offset of the first character.
    pub start: usize,
}

/// Split `text` into contiguous tokens that together cover it exactly.
pub(crate) fn tokenize(text: &str, granularity: Granularity) -> Vec<Token<'_>> {
    match granularity {
        Granularity::Char => text
            .char_indices()
            .enumerate()
            .map(|(start, (byte, c))| Token {
                text: &text[byte..byte + c.len_utf8()],
                start,
            })
            .collect(),
        Granularity::Word => words(text),
    }
}

/// Runs of whitespace and runs of non-whitespace, alternating.
fn words(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut run_byte = 0;
    let mut run_start = 0;
    let mut run_is_space: Option<bool> = None;

    for (index, (byte, c)) in text.char_indices().enumerate() {
        let is_space = c.is_whitespace();
        match run_is_space {
            Some(prev) if prev == is_space => {}
            Some(_) => {
                tokens.push(Token {
                    text: &text[run_byte..byte],
                    start: run_start,
                });
                run_byte = byte;
                run_start = index;
            }
            None => {}
        }
        run_is_space = Some(is_space);
    }

    if run_is_space.is_some() {
        tokens.push(Token {
            text: &text[run_byte..],
            start: run_start,
        });
    }
    tokens
}
