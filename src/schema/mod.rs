//! IR schema
//!
//! The format-neutral document model every importer produces and every
//! exporter consumes.
//!
//! ```text
//! Corpus
//! ├── documents[]            (ordered, 1-indexed `order`)
//! │   ├── content_blocks[]   (0-indexed `sequence`)
//! │   │   ├── tokens[]
//! │   │   └── anchors[]
//! │   │       └── spans[]    (spans that start at this anchor)
//! │   └── annotations[]      (point at spans by id)
//! ├── mapping_tables[]       (versification provenance)
//! └── cross_references[]
//! ```
//!
//! Spans hold anchor ids, never references to other spans, so overlapping
//! structure needs no parent/child links. Lookups go through the id helpers
//! on [`Document`].

mod content;
mod kinds;
mod span;

pub use content::{Anchor, ContentBlock, Token};
pub use kinds::{AnnotationType, LossClass, MappingType, ModuleType, SpanType, TokenType};
pub use span::{Annotation, Span};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attr::Attributes;
use crate::checksum::Checksum;
use crate::mapping::MappingTable;
use crate::reference::Ref;
use crate::version::IR_VERSION;

/// Top-level container for one converted module
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Corpus {
    pub id: String,
    /// IR schema version the corpus was written against
    pub version: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "kinds::empty_as_none"
    )]
    pub module_type: Option<ModuleType>,
    /// Versification system name (e.g., "KJV", "LXX")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub versification: String,
    /// BCP-47 language tag
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub language: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub publisher: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rights: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_format: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<Document>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mapping_tables: Vec<MappingTable>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cross_references: Vec<CrossReference>,
    /// Hash of the source artifact the importer read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<Checksum>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "kinds::empty_as_none"
    )]
    pub loss_class: Option<LossClass>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl Corpus {
    /// Create an empty corpus stamped with the current IR version
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: IR_VERSION.to_string(),
            ..Default::default()
        }
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn document_mut(&mut self, id: &str) -> Option<&mut Document> {
        self.documents.iter_mut().find(|d| d.id == id)
    }

    /// Append a document, assigning the next 1-indexed `order`
    pub fn push_document(&mut self, mut document: Document) {
        document.order = self.documents.len() as i32 + 1;
        self.documents.push(document);
    }

    /// Iterate every content block of every document, in order
    pub fn content_blocks(&self) -> impl Iterator<Item = &ContentBlock> {
        self.documents.iter().flat_map(|d| d.content_blocks.iter())
    }

    /// Index cross references by their source reference
    pub fn cross_ref_index(&self) -> BTreeMap<&Ref, Vec<&CrossReference>> {
        let mut index: BTreeMap<&Ref, Vec<&CrossReference>> = BTreeMap::new();
        for xref in &self.cross_references {
            index.entry(&xref.source).or_default().push(xref);
        }
        index
    }

    /// Cross references whose source falls inside `reference`
    pub fn cross_refs_from<'a>(&'a self, reference: &'a Ref) -> impl Iterator<Item = &'a CrossReference> {
        self.cross_references
            .iter()
            .filter(move |x| reference.contains(&x.source))
    }

    /// Decode a corpus from its JSON encoding
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Canonical JSON encoding (sorted keys, no whitespace)
    pub fn to_json(&self) -> crate::Result<String> {
        crate::canonical::canonical_string(self)
    }
}

/// One book, article, or dictionary entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_ref: Option<Ref>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// 1-indexed position within the corpus
    #[serde(default)]
    pub order: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content_blocks: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

/// Byte range covered by a span, resolved through its anchors
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSpan<'a> {
    pub span: &'a Span,
    pub start_block: &'a str,
    pub start_offset: i64,
    pub end_block: &'a str,
    pub end_offset: i64,
}

impl ResolvedSpan<'_> {
    /// Whether start and end fall inside the same content block
    pub fn is_single_block(&self) -> bool {
        self.start_block == self.end_block
    }
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_ref(mut self, reference: Ref) -> Self {
        self.canonical_ref = Some(reference);
        self
    }

    /// Append a block, assigning the next 0-indexed `sequence`
    pub fn push_block(&mut self, mut block: ContentBlock) {
        block.sequence = self.content_blocks.len() as i32;
        self.content_blocks.push(block);
    }

    pub fn content_block(&self, id: &str) -> Option<&ContentBlock> {
        self.content_blocks.iter().find(|b| b.id == id)
    }

    /// Every anchor in the document, with its owning block
    pub fn anchors(&self) -> impl Iterator<Item = (&ContentBlock, &Anchor)> {
        self.content_blocks
            .iter()
            .flat_map(|b| b.anchors.iter().map(move |a| (b, a)))
    }

    pub fn anchor(&self, id: &str) -> Option<&Anchor> {
        self.anchors().map(|(_, a)| a).find(|a| a.id == id)
    }

    /// Every span in the document, in anchor order
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.anchors().flat_map(|(_, a)| a.spans.iter())
    }

    pub fn span(&self, id: &str) -> Option<&Span> {
        self.spans().find(|s| s.id == id)
    }

    /// Spans of one type, in anchor order
    pub fn spans_of_type<'a>(&'a self, span_type: &'a SpanType) -> impl Iterator<Item = &'a Span> {
        self.spans()
            .filter(move |s| s.span_type.as_ref() == Some(span_type))
    }

    /// Annotations attached to `span_id`
    pub fn annotations_for<'a>(&'a self, span_id: &'a str) -> impl Iterator<Item = &'a Annotation> {
        self.annotations.iter().filter(move |a| a.span_id == span_id)
    }

    /// Resolve a span's anchors to block ids and byte offsets.
    /// Returns `None` if the span or either anchor is missing.
    pub fn resolve_span(&self, span_id: &str) -> Option<ResolvedSpan<'_>> {
        let span = self.span(span_id)?;
        let (start_block, start) = self
            .anchors()
            .find(|(_, a)| a.id == span.start_anchor_id)?;
        let (end_block, end) = self
            .anchors()
            .find(|(_, a)| a.id == span.end_anchor_id)?;
        Some(ResolvedSpan {
            span,
            start_block: &start_block.id,
            start_offset: start.char_offset,
            end_block: &end_block.id,
            end_offset: end.char_offset,
        })
    }

    /// Text covered by a span that starts and ends in the same block
    pub fn span_text(&self, span_id: &str) -> Option<&str> {
        let resolved = self.resolve_span(span_id)?;
        if !resolved.is_single_block() {
            return None;
        }
        self.content_block(resolved.start_block)?
            .slice(resolved.start_offset, resolved.end_offset)
    }
}

/// A link from one passage to another
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CrossReference {
    pub id: String,
    pub source: Ref,
    pub target: Ref,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "crate::attr::finite_opt_f64"
    )]
    pub confidence: Option<f64>,
}

impl CrossReference {
    pub fn new(id: impl Into<String>, source: Ref, target: Ref) -> Self {
        Self {
            id: id.into(),
            source,
            target,
            label: None,
            confidence: None,
        }
    }
}

/// An element that did not survive a conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LostElement {
    /// Where the element lived (document id, ref, or dotted path)
    pub path: String,
    pub element_type: String,
    pub reason: String,
}

/// Fidelity report for a conversion or versification mapping
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LossReport {
    pub source_format: String,
    pub target_format: String,
    pub loss_class: LossClass,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lost_elements: Vec<LostElement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl LossReport {
    /// A lossless report; callers downgrade it as they detect loss
    pub fn new(source_format: impl Into<String>, target_format: impl Into<String>) -> Self {
        Self {
            source_format: source_format.into(),
            target_format: target_format.into(),
            loss_class: LossClass::L0,
            lost_elements: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Raise the loss class to `class` if it is more severe. Never improves it.
    pub fn downgrade(&mut self, class: LossClass) {
        if class > self.loss_class {
            self.loss_class = class;
        }
    }

    /// Record a lost element and downgrade to `class`
    pub fn record_loss(
        &mut self,
        class: LossClass,
        path: impl Into<String>,
        element_type: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.downgrade(class);
        self.lost_elements.push(LostElement {
            path: path.into(),
            element_type: element_type.into(),
            reason: reason.into(),
        });
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn is_lossless(&self) -> bool {
        self.loss_class == LossClass::L0
    }
}
