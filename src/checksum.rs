//! Content hashing and integrity verification
//!
//! Content blocks are identified by the SHA-256 of their text alone; token
//! and annotation metadata never affect a block's hash. Whole entities
//! (corpus, document, mapping table) hash their canonical JSON encoding.
//!
//! A block without a stored hash is "unknown", not tampered: verification
//! reports it as unverified but never as a mismatch.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::canonical_bytes;
use crate::error::Result;
use crate::mapping::MappingTable;
use crate::schema::{ContentBlock, Corpus, Document};

/// Lower-case hex SHA-256 digest
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum from text
    pub fn from_text(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Compute checksum over the canonical encoding of any serializable value
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::from_bytes(&canonical_bytes(value)?))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that text matches this checksum
    pub fn verify(&self, content: &str) -> bool {
        Self::from_text(content) == *self
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Checksum {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Checksum {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Hex SHA-256 of raw bytes
pub fn hash_bytes(data: &[u8]) -> String {
    Checksum::from_bytes(data).0
}

/// Hex SHA-256 of a string's UTF-8 bytes
pub fn hash_string(s: &str) -> String {
    Checksum::from_text(s).0
}

/// Hash of the corpus's canonical encoding
pub fn hash_corpus(corpus: &Corpus) -> Result<Checksum> {
    Checksum::of(corpus)
}

/// Hash of the document's canonical encoding
pub fn hash_document(document: &Document) -> Result<Checksum> {
    Checksum::of(document)
}

/// Hash of the mapping table's canonical encoding
pub fn hash_mapping_table(table: &MappingTable) -> Result<Checksum> {
    Checksum::of(table)
}

/// Hash of a block's text only
pub fn hash_content_block(block: &ContentBlock) -> Checksum {
    Checksum::from_text(&block.text)
}

/// Stamp every content block in the corpus with the hash of its text.
/// Returns the number of blocks stamped.
pub fn compute_all_hashes(corpus: &mut Corpus) -> usize {
    let mut stamped = 0;
    for document in &mut corpus.documents {
        for block in &mut document.content_blocks {
            block.compute_hash();
            stamped += 1;
        }
    }
    tracing::debug!(corpus = %corpus.id, blocks = stamped, "stamped content block hashes");
    stamped
}

/// Ids of blocks whose stored hash disagrees with their text.
/// Blocks without a stored hash are skipped. Empty means fully verified.
pub fn verify_all_hashes(corpus: &Corpus) -> Vec<String> {
    corpus
        .content_blocks()
        .filter(|block| block.hash.is_some() && !block.verify_hash())
        .map(|block| block.id.clone())
        .collect()
}

/// Ids of blocks that carry no hash at all
pub fn unhashed_blocks(corpus: &Corpus) -> Vec<String> {
    corpus
        .content_blocks()
        .filter(|block| block.hash.is_none())
        .map(|block| block.id.clone())
        .collect()
}

/// True only if a hash is stored and it matches the block's text
pub fn verify_content_block_hash(block: &ContentBlock) -> bool {
    block.verify_hash()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::AttrValue;
    use crate::mapping::RefMapping;
    use crate::reference::Ref;
    use crate::schema::{Annotation, AnnotationType, CrossReference, Document, Token, TokenType};

    fn corpus_with_blocks(texts: &[&str]) -> Corpus {
        let mut corpus = Corpus::new("test");
        let mut doc = Document::new("Gen", "Genesis");
        for (i, text) in texts.iter().enumerate() {
            doc.push_block(ContentBlock::new(format!("b{}", i), 0, *text));
        }
        corpus.push_document(doc);
        corpus
    }

    #[test]
    fn test_hash_string_known_vector() {
        assert_eq!(
            hash_string("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash_bytes(b"abc"), hash_string("abc"));
    }

    #[test]
    fn test_checksum_serializes_as_bare_string() {
        let checksum = Checksum::from_text("abc");
        let json = serde_json::to_string(&checksum).unwrap();
        assert_eq!(json, format!("\"{}\"", checksum));
    }

    #[test]
    fn test_content_block_hash_ignores_metadata() {
        let plain = ContentBlock::new("b1", 0, "In the beginning");
        let mut rich = plain.clone();
        rich.id = "other".into();
        rich.tokens.push(Token {
            id: "t0".into(),
            char_end: 2,
            text: "In".into(),
            token_type: TokenType::Word,
            ..Default::default()
        });
        assert_eq!(hash_content_block(&plain), hash_content_block(&rich));
    }

    #[test]
    fn test_compute_then_verify_all() {
        let mut corpus = corpus_with_blocks(&["one", "two", "three"]);
        assert!(verify_all_hashes(&corpus).is_empty());
        assert_eq!(unhashed_blocks(&corpus).len(), 3);

        assert_eq!(compute_all_hashes(&mut corpus), 3);
        assert!(verify_all_hashes(&corpus).is_empty());
        assert!(unhashed_blocks(&corpus).is_empty());

        corpus.documents[0].content_blocks[1].text = "tampered".into();
        assert_eq!(verify_all_hashes(&corpus), vec!["b1".to_string()]);
    }

    #[test]
    fn test_verify_block_without_hash_is_false() {
        let block = ContentBlock::new("b1", 0, "text");
        assert!(!verify_content_block_hash(&block));
    }

    #[test]
    fn test_hash_corpus_changes_with_content() {
        let a = corpus_with_blocks(&["one"]);
        let b = corpus_with_blocks(&["two"]);
        assert_eq!(hash_corpus(&a).unwrap(), hash_corpus(&a.clone()).unwrap());
        assert_ne!(hash_corpus(&a).unwrap(), hash_corpus(&b).unwrap());
        assert_ne!(
            hash_document(&a.documents[0]).unwrap(),
            hash_document(&b.documents[0]).unwrap()
        );
    }

    #[test]
    fn test_unencodable_attribute_propagates() {
        let mut corpus = corpus_with_blocks(&["one"]);
        corpus.documents[0].content_blocks[0]
            .attributes
            .insert("weight".into(), AttrValue::Float(f64::NAN));
        assert!(hash_corpus(&corpus).is_err());
        assert!(hash_document(&corpus.documents[0]).is_err());
    }

    #[test]
    fn test_non_finite_confidence_propagates() {
        let mut corpus = corpus_with_blocks(&["one"]);
        corpus.documents[0].annotations.push(
            Annotation::new("n1", "s1", AnnotationType::Gloss, "x").with_confidence(f64::NAN),
        );
        assert!(hash_corpus(&corpus).is_err());
        assert!(corpus.to_json().is_err());

        let mut corpus = corpus_with_blocks(&["one"]);
        let mut xref = CrossReference::new("x1", Ref::new("Gen", 1, 1), Ref::new("John", 1, 1));
        xref.confidence = Some(f64::INFINITY);
        corpus.cross_references.push(xref);
        assert!(hash_corpus(&corpus).is_err());
        assert!(corpus.to_json().is_err());

        corpus.cross_references[0].confidence = Some(0.5);
        let encoded = corpus.to_json().unwrap();
        assert_eq!(Corpus::from_json(&encoded).unwrap().to_json().unwrap(), encoded);
    }

    #[test]
    fn test_hash_mapping_table() {
        let table = MappingTable::new("kjv-lxx", "KJV", "LXX")
            .with_mapping(RefMapping::exact(Ref::new("Ps", 10, 1), Ref::new("Ps", 9, 22)));
        let first = hash_mapping_table(&table).unwrap();
        assert_eq!(first, hash_mapping_table(&table.clone()).unwrap());
        assert_eq!(first, hash_mapping_table(&table).unwrap());

        let mut moved = table.clone();
        moved.mappings[0].to = Ref::new("Ps", 9, 23);
        assert_ne!(first, hash_mapping_table(&moved).unwrap());
    }

    #[test]
    fn test_attribute_insertion_order_does_not_affect_hash() {
        let mut a = Document::new("Gen", "Genesis");
        a.attributes.insert("zeta".into(), AttrValue::Int(1));
        a.attributes.insert("alpha".into(), "x".into());

        let mut b = Document::new("Gen", "Genesis");
        b.attributes.insert("alpha".into(), "x".into());
        b.attributes.insert("zeta".into(), AttrValue::Int(1));

        assert_eq!(hash_document(&a).unwrap(), hash_document(&b).unwrap());
    }
}
