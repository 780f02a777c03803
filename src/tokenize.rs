//! Word/whitespace/punctuation tokenizer
//!
//! Offsets are UTF-8 byte offsets into the input. The token stream is total:
//! joining every token's text in order gives back the input unchanged.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;

use crate::schema::{Token, TokenType};

fn decimal_digit_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\p{Nd}$").expect("digit pattern is a valid regex"))
}

/// Decimal digits (Unicode `Nd`) only; superscripts and fractions are not digits
fn is_decimal_digit(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_digit();
    }
    c.is_numeric() && decimal_digit_pattern().is_match(c.encode_utf8(&mut [0; 4]))
}

fn classify(c: char) -> TokenType {
    if c.is_alphabetic() || is_decimal_digit(c) || is_combining_mark(c) {
        TokenType::Word
    } else if c.is_whitespace() {
        TokenType::Whitespace
    } else {
        TokenType::Punctuation
    }
}

/// Split `text` into tokens with ids `t0`, `t1`, ...
pub fn tokenize(text: &str) -> Vec<Token> {
    tokenize_with_prefix(text, "t")
}

/// Split `text` into tokens whose ids are `<prefix><index>`
pub fn tokenize_with_prefix(text: &str, prefix: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let kind = classify(c);
        let mut end = start + c.len_utf8();

        // Punctuation is one token per character; the other kinds extend to
        // the end of the run.
        if kind != TokenType::Punctuation {
            while let Some(&(next_start, next)) = chars.peek() {
                if classify(next) != kind {
                    break;
                }
                end = next_start + next.len_utf8();
                chars.next();
            }
        }

        let index = tokens.len();
        tokens.push(Token {
            id: format!("{}{}", prefix, index),
            index: index as i32,
            char_start: start as i64,
            char_end: end as i64,
            text: text[start..end].to_string(),
            token_type: kind,
            lemma: None,
            strongs: Vec::new(),
            morphology: None,
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn summary(text: &str) -> Vec<(String, TokenType)> {
        tokenize(text)
            .into_iter()
            .map(|t| (t.text, t.token_type))
            .collect()
    }

    #[test]
    fn test_hello_world() {
        assert_eq!(
            summary("Hello, world!"),
            vec![
                ("Hello".to_string(), TokenType::Word),
                (",".to_string(), TokenType::Punctuation),
                (" ".to_string(), TokenType::Whitespace),
                ("world".to_string(), TokenType::Word),
                ("!".to_string(), TokenType::Punctuation),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_punctuation_is_one_token_per_char() {
        let tokens = summary("...");
        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(|(_, k)| *k == TokenType::Punctuation));
    }

    #[test]
    fn test_whitespace_run_is_one_token() {
        let tokens = summary("a \t\n b");
        assert_eq!(tokens[1], (" \t\n ".to_string(), TokenType::Whitespace));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_byte_offsets_for_multibyte_text() {
        // Hebrew with niqqud: combining marks stay inside the word
        let text = "בְּרֵאשִׁית בָּרָא";
        let tokens = tokenize(text);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].token_type, TokenType::Word);
        assert_eq!(tokens[0].char_start, 0);
        assert_eq!(tokens[0].char_end as usize, "בְּרֵאשִׁית".len());
        assert_eq!(&text[tokens[2].char_start as usize..tokens[2].char_end as usize], "בָּרָא");
    }

    #[test]
    fn test_digits_are_words() {
        let tokens = summary("Ps 119:105");
        assert_eq!(tokens[2], ("119".to_string(), TokenType::Word));
        assert_eq!(tokens[3], (":".to_string(), TokenType::Punctuation));
    }

    #[test]
    fn test_ids_and_indices() {
        let tokens = tokenize_with_prefix("In the", "b1.t");
        assert_eq!(tokens[0].id, "b1.t0");
        assert_eq!(tokens[2].id, "b1.t2");
        assert_eq!(tokens[2].index, 2);
    }

    #[test]
    fn test_only_decimal_digits_join_words() {
        assert_eq!(
            summary("10½"),
            vec![
                ("10".to_string(), TokenType::Word),
                ("½".to_string(), TokenType::Punctuation),
            ]
        );
        assert_eq!(summary("x²")[1], ("²".to_string(), TokenType::Punctuation));
        assert_eq!(summary("٣٤"), vec![("٣٤".to_string(), TokenType::Word)]);
    }

    proptest! {
        #[test]
        fn prop_tokens_reconstruct_input(text in "\\PC*") {
            let tokens = tokenize(&text);
            let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
            prop_assert_eq!(joined, text.clone());
        }

        #[test]
        fn prop_offsets_are_contiguous(text in "\\PC*") {
            let tokens = tokenize(&text);
            let mut cursor = 0i64;
            for t in &tokens {
                prop_assert_eq!(t.char_start, cursor);
                prop_assert!(t.char_end > t.char_start);
                cursor = t.char_end;
            }
            prop_assert_eq!(cursor, text.len() as i64);
        }
    }
}
