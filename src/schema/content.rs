//! Content blocks and the tokens and anchors they own

use serde::{Deserialize, Serialize};

use super::kinds::TokenType;
use super::span::Span;
use crate::attr::Attributes;
use crate::checksum::Checksum;
use crate::tokenize::tokenize_with_prefix;

/// A contiguous unit of text (paragraph, section, entry body)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentBlock {
    pub id: String,
    /// 0-indexed position within the document
    pub sequence: i32,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<Token>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<Anchor>,
    /// SHA-256 of `text`; absent until `compute_hash` runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Checksum>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl ContentBlock {
    pub fn new(id: impl Into<String>, sequence: i32, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sequence,
            text: text.into(),
            ..Default::default()
        }
    }

    /// Stamp the block with the hash of its current text
    pub fn compute_hash(&mut self) -> &Checksum {
        self.hash.insert(Checksum::from_text(&self.text))
    }

    /// False when no hash is stored or the stored hash no longer matches `text`
    pub fn verify_hash(&self) -> bool {
        self.hash
            .as_ref()
            .is_some_and(|hash| hash.verify(&self.text))
    }

    /// Replace `tokens` with a fresh tokenization of `text`.
    /// Token ids are `<block id>.t<n>`.
    pub fn tokenize(&mut self) -> &[Token] {
        self.tokens = tokenize_with_prefix(&self.text, &format!("{}.t", self.id));
        &self.tokens
    }

    pub fn anchor(&self, id: &str) -> Option<&Anchor> {
        self.anchors.iter().find(|a| a.id == id)
    }

    /// Add an anchor at `char_offset`, bound to this block and its current hash
    pub fn add_anchor(&mut self, id: impl Into<String>, char_offset: i64) -> &mut Anchor {
        let token_index = self
            .tokens
            .iter()
            .find(|t| t.char_start <= char_offset && char_offset < t.char_end)
            .map(|t| t.index);
        self.anchors.push(Anchor {
            id: id.into(),
            content_block_id: self.id.clone(),
            char_offset,
            token_index,
            hash: self.hash.clone(),
            spans: Vec::new(),
        });
        let last = self.anchors.len() - 1;
        &mut self.anchors[last]
    }

    /// Substring of `text` between two byte offsets, if both fall on char boundaries
    pub fn slice(&self, start: i64, end: i64) -> Option<&str> {
        let start = usize::try_from(start).ok()?;
        let end = usize::try_from(end).ok()?;
        self.text.get(start..end)
    }
}

/// A word, whitespace run, or punctuation mark within a block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub index: i32,
    /// Byte offset of the first byte, inclusive
    pub char_start: i64,
    /// Byte offset past the last byte, exclusive
    pub char_end: i64,
    pub text: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strongs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morphology: Option<String>,
}

/// A stand-off position marker inside a block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Anchor {
    pub id: String,
    pub content_block_id: String,
    /// Byte offset into the owning block's text
    pub char_offset: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_index: Option<i32>,
    /// Hash of the owning block when the anchor was placed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Checksum>,
    /// Spans that start at this anchor
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<Span>,
}

impl Anchor {
    /// Whether the owning block changed since this anchor was placed.
    /// Anchors placed before hashing are never considered stale.
    pub fn is_stale(&self, block: &ContentBlock) -> bool {
        match (&self.hash, &block.hash) {
            (Some(anchored), Some(current)) => anchored != current,
            (Some(anchored), None) => !anchored.verify(&block.text),
            _ => false,
        }
    }
}
