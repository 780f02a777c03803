//! Structural validation
//!
//! Validators never stop at the first defect: each returns every independent
//! error it finds, tagged with a dotted path such as
//! `corpus.documents[2].content_blocks[0].tokens[1].char_end`.
//!
//! Nested entities are validated through the [`Validator`] trait so a test can
//! substitute any single level (e.g., a document validator that always fails)
//! and check how parent validators wrap and re-prefix its errors. Production
//! code uses [`StandardValidator`] through the free functions.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::mapping::{MappingTable, RefMapping};
use crate::reference::Ref;
use crate::schema::{
    Annotation, ContentBlock, Corpus, CrossReference, Document, LossReport, MappingType, Span,
};

/// A single structural defect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field; empty for entity-level messages
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Nest this error under `prefix`
    fn prefixed(mut self, prefix: &str) -> Self {
        self.path = if self.path.is_empty() {
            prefix.to_string()
        } else {
            format!("{}.{}", prefix, self.path)
        };
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// All errors from one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl From<Vec<ValidationError>> for ValidationReport {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "valid");
        }
        writeln!(f, "{} validation error(s):", self.errors.len())?;
        for error in &self.errors {
            writeln!(f, "  - {}", error)?;
        }
        Ok(())
    }
}

fn nest(errors: &mut Vec<ValidationError>, prefix: &str, nested: Vec<ValidationError>) {
    errors.extend(nested.into_iter().map(|e| e.prefixed(prefix)));
}

fn versification_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9_.-]*$").expect("versification pattern is a valid regex")
    })
}

/// Whether `name` is a well-formed versification system identifier
pub fn is_valid_versification_id(name: &str) -> bool {
    versification_pattern().is_match(name)
}

/// Per-entity validators used when walking a corpus.
///
/// Every method defaults to the standard rules; override one to replace that
/// level of the walk.
pub trait Validator {
    fn validate_document(&self, document: &Document) -> Vec<ValidationError> {
        validate_document_with(self, document)
    }

    fn validate_content_block(&self, block: &ContentBlock) -> Vec<ValidationError> {
        validate_content_block_with(self, block)
    }

    fn validate_span(&self, span: &Span) -> Vec<ValidationError> {
        validate_span_with(self, span)
    }

    fn validate_annotation(&self, annotation: &Annotation) -> Vec<ValidationError> {
        validate_annotation(annotation)
    }

    fn validate_ref(&self, reference: &Ref) -> Vec<ValidationError> {
        validate_ref(reference)
    }

    fn validate_mapping_table(&self, table: &MappingTable) -> Vec<ValidationError> {
        validate_mapping_table_with(self, table)
    }

    fn validate_cross_reference(&self, xref: &CrossReference) -> Vec<ValidationError> {
        validate_cross_reference_with(self, xref)
    }
}

/// The production rule set
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardValidator;

impl Validator for StandardValidator {}

/// Validate a corpus and everything it contains. Paths are rooted at `corpus`.
pub fn validate_corpus(corpus: &Corpus) -> Vec<ValidationError> {
    validate_corpus_with(&StandardValidator, corpus)
}

/// Alias for [`validate_corpus`]
pub fn validate(corpus: &Corpus) -> Vec<ValidationError> {
    validate_corpus(corpus)
}

/// Whether [`validate`] finds no errors
pub fn is_valid(corpus: &Corpus) -> bool {
    validate(corpus).is_empty()
}

pub fn validate_corpus_with<V: Validator + ?Sized>(validator: &V, corpus: &Corpus) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if corpus.id.is_empty() {
        errors.push(ValidationError::new("id", "corpus ID is required"));
    }
    if corpus.version.is_empty() {
        errors.push(ValidationError::new("version", "corpus version is required"));
    }
    if let Some(module_type) = &corpus.module_type {
        if !module_type.is_known() {
            errors.push(ValidationError::new(
                "module_type",
                format!("invalid module type {:?}", module_type.as_str()),
            ));
        }
    }
    if let Some(loss_class) = &corpus.loss_class {
        if !loss_class.is_known() {
            errors.push(ValidationError::new(
                "loss_class",
                format!("invalid loss class {:?}", loss_class.as_str()),
            ));
        }
    }

    for (i, document) in corpus.documents.iter().enumerate() {
        nest(&mut errors, &format!("documents[{}]", i), validator.validate_document(document));
    }
    for (i, table) in corpus.mapping_tables.iter().enumerate() {
        nest(&mut errors, &format!("mapping_tables[{}]", i), validator.validate_mapping_table(table));
    }
    for (i, xref) in corpus.cross_references.iter().enumerate() {
        nest(
            &mut errors,
            &format!("cross_references[{}]", i),
            validator.validate_cross_reference(xref),
        );
    }

    errors.into_iter().map(|e| e.prefixed("corpus")).collect()
}

pub fn validate_document(document: &Document) -> Vec<ValidationError> {
    validate_document_with(&StandardValidator, document)
}

pub fn validate_document_with<V: Validator + ?Sized>(validator: &V, document: &Document) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if document.id.is_empty() {
        errors.push(ValidationError::new("id", "document ID is required"));
    }
    if let Some(reference) = &document.canonical_ref {
        nest(&mut errors, "canonical_ref", validator.validate_ref(reference));
    }
    for (i, block) in document.content_blocks.iter().enumerate() {
        nest(&mut errors, &format!("content_blocks[{}]", i), validator.validate_content_block(block));
    }
    for (i, annotation) in document.annotations.iter().enumerate() {
        nest(&mut errors, &format!("annotations[{}]", i), validator.validate_annotation(annotation));
    }

    errors
}

pub fn validate_content_block(block: &ContentBlock) -> Vec<ValidationError> {
    validate_content_block_with(&StandardValidator, block)
}

pub fn validate_content_block_with<V: Validator + ?Sized>(validator: &V, block: &ContentBlock) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if block.id.is_empty() {
        errors.push(ValidationError::new("id", "content block ID is required"));
    }
    if block.sequence < 0 {
        errors.push(ValidationError::new(
            "sequence",
            format!("sequence must be non-negative, got {}", block.sequence),
        ));
    }
    // A missing hash is unknown, not wrong
    if block.hash.is_some() && !block.verify_hash() {
        errors.push(ValidationError::new("hash", "hash does not match content"));
    }

    for (i, token) in block.tokens.iter().enumerate() {
        if token.char_start < 0 {
            errors.push(ValidationError::new(
                format!("tokens[{}].char_start", i),
                format!("char_start must be non-negative, got {}", token.char_start),
            ));
        }
        if token.char_end < token.char_start {
            errors.push(ValidationError::new(
                format!("tokens[{}].char_end", i),
                format!(
                    "char_end {} precedes char_start {}",
                    token.char_end, token.char_start
                ),
            ));
        }
    }

    for (i, anchor) in block.anchors.iter().enumerate() {
        if anchor.char_offset < 0 {
            errors.push(ValidationError::new(
                format!("anchors[{}].char_offset", i),
                format!("char_offset must be non-negative, got {}", anchor.char_offset),
            ));
        }
        for (k, span) in anchor.spans.iter().enumerate() {
            nest(
                &mut errors,
                &format!("anchors[{}].spans[{}]", i, k),
                validator.validate_span(span),
            );
        }
    }

    errors
}

pub fn validate_span(span: &Span) -> Vec<ValidationError> {
    validate_span_with(&StandardValidator, span)
}

pub fn validate_span_with<V: Validator + ?Sized>(validator: &V, span: &Span) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if span.id.is_empty() {
        errors.push(ValidationError::new("id", "span ID is required"));
    }
    if let Some(span_type) = &span.span_type {
        if !span_type.is_known() {
            errors.push(ValidationError::new(
                "type",
                format!("invalid span type {:?}", span_type.as_str()),
            ));
        }
    }
    if span.start_anchor_id.is_empty() {
        errors.push(ValidationError::new("start_anchor_id", "start anchor ID is required"));
    }
    if span.end_anchor_id.is_empty() {
        errors.push(ValidationError::new("end_anchor_id", "end anchor ID is required"));
    }
    if let Some(reference) = &span.reference {
        nest(&mut errors, "ref", validator.validate_ref(reference));
    }

    errors
}

pub fn validate_ref(reference: &Ref) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if reference.book.is_empty() {
        errors.push(ValidationError::new("book", "book is required"));
    }
    if reference.chapter < 0 {
        errors.push(ValidationError::new(
            "chapter",
            format!("chapter must be non-negative, got {}", reference.chapter),
        ));
    }
    if reference.verse < 0 {
        errors.push(ValidationError::new(
            "verse",
            format!("verse must be non-negative, got {}", reference.verse),
        ));
    }
    if reference.verse_end != 0 && reference.verse_end < reference.verse {
        errors.push(ValidationError::new(
            "verse_end",
            format!(
                "verse_end {} precedes verse {}",
                reference.verse_end, reference.verse
            ),
        ));
    }

    errors
}

pub fn validate_annotation(annotation: &Annotation) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if annotation.id.is_empty() {
        errors.push(ValidationError::new("id", "annotation ID is required"));
    }
    if annotation.span_id.is_empty() {
        errors.push(ValidationError::new("span_id", "span ID is required"));
    }
    if let Some(annotation_type) = &annotation.annotation_type {
        if !annotation_type.is_known() {
            errors.push(ValidationError::new(
                "type",
                format!("invalid annotation type {:?}", annotation_type.as_str()),
            ));
        }
    }
    if annotation.confidence != 0.0 && !(0.0..=1.0).contains(&annotation.confidence) {
        errors.push(ValidationError::new(
            "confidence",
            format!("confidence must be in [0, 1], got {}", annotation.confidence),
        ));
    }

    errors
}

pub fn validate_mapping_table(table: &MappingTable) -> Vec<ValidationError> {
    validate_mapping_table_with(&StandardValidator, table)
}

pub fn validate_mapping_table_with<V: Validator + ?Sized>(validator: &V, table: &MappingTable) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if table.id.is_empty() {
        errors.push(ValidationError::new("id", "mapping table ID is required"));
    }
    for (field, system) in [("from_system", &table.from_system), ("to_system", &table.to_system)] {
        if !system.is_empty() && !is_valid_versification_id(system) {
            errors.push(ValidationError::new(
                field,
                format!("invalid versification identifier {:?}", system),
            ));
        }
    }
    for (i, mapping) in table.mappings.iter().enumerate() {
        nest(&mut errors, &format!("mappings[{}]", i), validate_ref_mapping(validator, mapping));
    }

    errors
}

fn validate_ref_mapping<V: Validator + ?Sized>(validator: &V, mapping: &RefMapping) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !mapping.mapping_type.is_known() {
        errors.push(ValidationError::new(
            "type",
            format!("invalid mapping type {:?}", mapping.mapping_type.as_str()),
        ));
    }
    // `added` entries have no source and `missing` entries have no target
    if mapping.mapping_type != MappingType::Added {
        nest(&mut errors, "from", validator.validate_ref(&mapping.from));
    }
    if mapping.mapping_type != MappingType::Missing {
        nest(&mut errors, "to", validator.validate_ref(&mapping.to));
    }
    for (j, target) in mapping.to_refs.iter().enumerate() {
        nest(&mut errors, &format!("to_refs[{}]", j), validator.validate_ref(target));
    }

    errors
}

pub fn validate_cross_reference(xref: &CrossReference) -> Vec<ValidationError> {
    validate_cross_reference_with(&StandardValidator, xref)
}

pub fn validate_cross_reference_with<V: Validator + ?Sized>(validator: &V, xref: &CrossReference) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if xref.id.is_empty() {
        errors.push(ValidationError::new("id", "cross reference ID is required"));
    }
    nest(&mut errors, "source", validator.validate_ref(&xref.source));
    nest(&mut errors, "target", validator.validate_ref(&xref.target));
    if let Some(confidence) = xref.confidence {
        if !(0.0..=1.0).contains(&confidence) {
            errors.push(ValidationError::new(
                "confidence",
                format!("confidence must be in [0, 1], got {}", confidence),
            ));
        }
    }

    errors
}

pub fn validate_loss_report(report: &LossReport) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if report.source_format.is_empty() {
        errors.push(ValidationError::new("source_format", "source format is required"));
    }
    if report.target_format.is_empty() {
        errors.push(ValidationError::new("target_format", "target format is required"));
    }
    if !report.loss_class.is_known() {
        errors.push(ValidationError::new(
            "loss_class",
            format!("invalid loss class {:?}", report.loss_class.as_str()),
        ));
    }

    errors
}

/// Referential integrity across a corpus: span anchors resolve inside their
/// document, anchor ids are unique per document, anchors name their owning
/// block, and annotations point at existing spans.
///
/// Separate from [`validate_corpus`]: a structurally valid corpus may still be
/// mid-construction with dangling ids.
pub fn validate_references(corpus: &Corpus) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (d, document) in corpus.documents.iter().enumerate() {
        let doc_path = format!("corpus.documents[{}]", d);

        let mut anchor_ids: HashMap<&str, usize> = HashMap::new();
        for (_, anchor) in document.anchors() {
            *anchor_ids.entry(anchor.id.as_str()).or_default() += 1;
        }
        let span_ids: HashSet<&str> = document.spans().map(|s| s.id.as_str()).collect();

        for (b, block) in document.content_blocks.iter().enumerate() {
            for (a, anchor) in block.anchors.iter().enumerate() {
                let anchor_path = format!("{}.content_blocks[{}].anchors[{}]", doc_path, b, a);

                if anchor_ids.get(anchor.id.as_str()).copied().unwrap_or(0) > 1 {
                    errors.push(ValidationError::new(
                        format!("{}.id", anchor_path),
                        format!("duplicate anchor ID {:?}", anchor.id),
                    ));
                }
                if !anchor.content_block_id.is_empty() && anchor.content_block_id != block.id {
                    errors.push(ValidationError::new(
                        format!("{}.content_block_id", anchor_path),
                        format!(
                            "anchor names block {:?} but lives in {:?}",
                            anchor.content_block_id, block.id
                        ),
                    ));
                }

                for (s, span) in anchor.spans.iter().enumerate() {
                    let span_path = format!("{}.spans[{}]", anchor_path, s);
                    if span.start_anchor_id != anchor.id {
                        errors.push(ValidationError::new(
                            format!("{}.start_anchor_id", span_path),
                            format!(
                                "span is stored on anchor {:?} but starts at {:?}",
                                anchor.id, span.start_anchor_id
                            ),
                        ));
                    }
                    if !span.end_anchor_id.is_empty()
                        && !anchor_ids.contains_key(span.end_anchor_id.as_str())
                    {
                        errors.push(ValidationError::new(
                            format!("{}.end_anchor_id", span_path),
                            format!("unknown anchor {:?}", span.end_anchor_id),
                        ));
                    }
                }
            }
        }

        for (n, annotation) in document.annotations.iter().enumerate() {
            if !annotation.span_id.is_empty() && !span_ids.contains(annotation.span_id.as_str()) {
                errors.push(ValidationError::new(
                    format!("{}.annotations[{}].span_id", doc_path, n),
                    format!("unknown span {:?}", annotation.span_id),
                ));
            }
        }
    }

    errors
}
