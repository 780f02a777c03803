//! Scripture IR
//!
//! The format-neutral intermediate representation shared by every Bible
//! module importer and exporter, plus the machinery that operates on it:
//!
//! - **IR Schema**: Corpus → Document → ContentBlock → {Token, Anchor}, with
//!   stand-off Spans and Annotations for overlapping structure
//! - **Hashing**: SHA-256 content identity for blocks and canonical-encoding
//!   signatures for whole entities
//! - **Validation**: exhaustive, path-annotated structural checks
//! - **Versification Mapping**: pairwise tables, a registry that bridges
//!   systems through one intermediate hop, and corpus-wide remapping with
//!   loss reporting
//!
//! ## Pipeline
//!
//! ```text
//! importer ──► Corpus ──► MappingRegistry ──► (Corpus, LossReport)
//!                                │
//!                                ▼
//!                          validate_corpus ──► compute_all_hashes ──► exporter
//! ```
//!
//! Mapping never fails on missing data: a reference with no known mapping
//! is returned unchanged.

pub mod attr;
pub mod canonical;
pub mod checksum;
pub mod config;
pub mod error;
pub mod mapping;
pub mod reference;
pub mod registry;
pub mod schema;
pub mod tokenize;
pub mod validation;
pub mod version;

pub use attr::{AttrValue, Attributes};
pub use checksum::{
    compute_all_hashes, hash_bytes, hash_content_block, hash_corpus, hash_document,
    hash_mapping_table, hash_string, verify_all_hashes, verify_content_block_hash, Checksum,
};
pub use config::IrConfig;
pub use error::{IrError, Result};
pub use mapping::{merge_refs, split_ref, MappingTable, RefMapping, Resolution, ResolutionKind};
pub use reference::Ref;
pub use registry::MappingRegistry;
pub use schema::{
    Anchor, Annotation, AnnotationType, ContentBlock, Corpus, CrossReference, Document, LossClass,
    LossReport, LostElement, MappingType, ModuleType, Span, SpanType, Token, TokenType,
};
pub use tokenize::tokenize;
pub use validation::{
    is_valid, validate, validate_corpus, validate_references, StandardValidator, ValidationError,
    ValidationReport, Validator,
};
pub use version::{IrVersion, IR_VERSION};
