//! Stand-off spans and the annotations attached to them

use serde::{Deserialize, Serialize};

use super::kinds::{AnnotationType, SpanType};
use crate::attr::{AttrValue, Attributes};
use crate::reference::Ref;

/// A region between two anchors.
///
/// Spans never contain one another; overlap (a verse crossing two poetry
/// lines) is expressed only through the anchor ids they point at.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Span {
    pub id: String,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::kinds::empty_as_none"
    )]
    pub span_type: Option<SpanType>,
    pub start_anchor_id: String,
    pub end_anchor_id: String,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Ref>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl Span {
    pub fn new(
        id: impl Into<String>,
        span_type: SpanType,
        start_anchor_id: impl Into<String>,
        end_anchor_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            span_type: Some(span_type),
            start_anchor_id: start_anchor_id.into(),
            end_anchor_id: end_anchor_id.into(),
            reference: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_ref(mut self, reference: Ref) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Whether the span starts and ends on the same anchor
    pub fn is_point(&self) -> bool {
        self.start_anchor_id == self.end_anchor_id
    }
}

/// Data attached to a span (Strong's number, footnote text, gloss, ...)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub span_id: String,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::kinds::empty_as_none"
    )]
    pub annotation_type: Option<AnnotationType>,
    #[serde(default, skip_serializing_if = "AttrValue::is_null")]
    pub value: AttrValue,
    /// Zero means "not given"; otherwise in `[0, 1]`
    #[serde(
        default,
        skip_serializing_if = "is_unset",
        serialize_with = "crate::attr::finite_f64"
    )]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

fn is_unset(confidence: &f64) -> bool {
    *confidence == 0.0
}

impl Annotation {
    pub fn new(
        id: impl Into<String>,
        span_id: impl Into<String>,
        annotation_type: AnnotationType,
        value: impl Into<AttrValue>,
    ) -> Self {
        Self {
            id: id.into(),
            span_id: span_id.into(),
            annotation_type: Some(annotation_type),
            value: value.into(),
            confidence: 0.0,
            source: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_encoding_uses_wire_names() {
        let span = Span::new("s1", SpanType::Verse, "a1", "a2").with_ref(Ref::new("Gen", 1, 1));
        let json = serde_json::to_value(&span).unwrap();
        assert_eq!(json["type"], "VERSE");
        assert_eq!(json["ref"]["book"], "Gen");
        assert!(json.get("attributes").is_none());
    }

    #[test]
    fn test_annotation_omits_unset_confidence() {
        let ann = Annotation::new("n1", "s1", AnnotationType::Strongs, "H7225");
        let json = serde_json::to_value(&ann).unwrap();
        assert!(json.get("confidence").is_none());
        assert_eq!(json["value"], "H7225");

        let ann = ann.with_confidence(0.9);
        let json = serde_json::to_value(&ann).unwrap();
        assert_eq!(json["confidence"], 0.9);
    }
}
