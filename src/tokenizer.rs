//! Splitting raw text into word tokens.
//!
//! Tokenization sits in front of the matching engine. The engine only needs an
//! ordered sequence of [`Token`]s; anything implementing [`Tokenizer`] can
//! provide it.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// A word of input and its position in the token sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub index: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, index: usize) -> Self {
        Self {
            text: text.into(),
            index,
        }
    }
}

/// Builds tokens from already-split words, numbering them in order.
pub fn tokens_from_words<I, S>(words: I) -> Vec<Token>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    words
        .into_iter()
        .enumerate()
        .map(|(index, word)| Token::new(word, index))
        .collect()
}

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Unicode word segmentation (UAX #29). Punctuation and whitespace are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        tokens_from_words(text.unicode_words())
    }
}

/// Splits on whitespace only; punctuation stays attached to words.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        tokens_from_words(text.split_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_word_tokenizer_drops_punctuation() {
        let tokens = WordTokenizer.tokenize("Set my top light to red, please!");
        assert_eq!(
            texts(&tokens),
            vec!["Set", "my", "top", "light", "to", "red", "please"]
        );
        assert_eq!(tokens[6].index, 6);
    }

    #[test]
    fn test_word_tokenizer_keeps_digits() {
        let tokens = WordTokenizer.tokenize("blink 3 times");
        assert_eq!(texts(&tokens), vec!["blink", "3", "times"]);
    }

    #[test]
    fn test_whitespace_tokenizer() {
        let tokens = WhitespaceTokenizer.tokenize("  red,  blue ");
        assert_eq!(texts(&tokens), vec!["red,", "blue"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(WordTokenizer.tokenize("   ").is_empty());
    }
}
