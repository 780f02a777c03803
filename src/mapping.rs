//! Versification mapping tables
//!
//! A [`MappingTable`] maps references from one versification system to
//! another. A reference with no entry maps to itself: absence of an entry
//! means "no change known", never an error.

use serde::{Deserialize, Serialize};

use crate::reference::Ref;
use crate::schema::{Corpus, LossClass, LossReport, MappingType};

/// One source reference and where it lands in the target system
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RefMapping {
    pub from: Ref,
    /// Primary target. Empty for `missing` mappings.
    #[serde(default)]
    pub to: Ref,
    /// All targets of a `split` mapping
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to_refs: Vec<Ref>,
    #[serde(rename = "type")]
    pub mapping_type: MappingType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

impl RefMapping {
    pub fn new(from: Ref, to: Ref, mapping_type: MappingType) -> Self {
        Self {
            from,
            to,
            to_refs: Vec::new(),
            mapping_type,
            note: String::new(),
        }
    }

    pub fn exact(from: Ref, to: Ref) -> Self {
        Self::new(from, to, MappingType::Exact)
    }

    /// A split mapping; the first target becomes `to`
    pub fn split(from: Ref, targets: Vec<Ref>) -> Self {
        let to = targets.first().cloned().unwrap_or_default();
        Self {
            from,
            to,
            to_refs: targets,
            mapping_type: MappingType::Split,
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// How a reference was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionKind {
    /// A direct table entry matched
    Exact,
    /// Resolved through a composed two-table chain
    Chained,
    /// Nothing matched; the input was returned unchanged
    Identity,
}

/// A mapped reference together with how it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub target: Ref,
    pub kind: ResolutionKind,
}

impl Resolution {
    pub fn identity(reference: &Ref) -> Self {
        Self {
            target: reference.clone(),
            kind: ResolutionKind::Identity,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.kind == ResolutionKind::Identity
    }
}

/// Pairwise mapping between two versification systems
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MappingTable {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub from_system: String,
    pub to_system: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<RefMapping>,
}

impl MappingTable {
    pub fn new(
        id: impl Into<String>,
        from_system: impl Into<String>,
        to_system: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            from_system: from_system.into(),
            to_system: to_system.into(),
            mappings: Vec::new(),
        }
    }

    pub fn with_mapping(mut self, mapping: RefMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    /// Display form of this table's system pair, `"<from>-<to>"`
    pub fn key(&self) -> String {
        table_key(&self.from_system, &self.to_system)
    }

    /// Exact match on (book, chapter, verse). Linear scan; `from` refs in a
    /// table are expected to be unique, so scan order does not matter.
    pub fn lookup(&self, reference: &Ref) -> Option<&RefMapping> {
        let key = reference.verse_key();
        self.mappings.iter().find(|m| m.from.verse_key() == key)
    }

    /// Map a reference, falling back to the input when no entry exists
    pub fn map_ref(&self, reference: &Ref) -> Ref {
        self.resolve(reference).target
    }

    /// Map a reference and report whether an entry matched
    pub fn resolve(&self, reference: &Ref) -> Resolution {
        match self.lookup(reference) {
            Some(mapping) => Resolution {
                target: mapping.to.clone(),
                kind: ResolutionKind::Exact,
            },
            None => Resolution::identity(reference),
        }
    }

    /// Produce a remapped copy of `corpus` in this table's target system.
    ///
    /// Document canonical refs go through [`map_ref`](Self::map_ref); blocks
    /// and annotations are copied as-is since verse identity lives on spans.
    /// The table is appended to the copy's `mapping_tables` for provenance.
    /// The report starts (and here stays) at `L0`; see
    /// [`apply_to_corpus_assessed`](Self::apply_to_corpus_assessed) for a
    /// report that reflects split, merge, and missing entries.
    pub fn apply_to_corpus(&self, corpus: &Corpus) -> (Corpus, LossReport) {
        let mut mapped = corpus.clone();
        mapped.versification = self.to_system.clone();
        for document in &mut mapped.documents {
            if let Some(reference) = &document.canonical_ref {
                document.canonical_ref = Some(self.map_ref(reference));
            }
        }
        mapped.mapping_tables.push(self.clone());

        tracing::debug!(
            corpus = %corpus.id,
            table = %self.id,
            from = %self.from_system,
            to = %self.to_system,
            "applied versification mapping"
        );

        (mapped, LossReport::new(&self.from_system, &self.to_system))
    }

    /// Inspect which of the corpus's document refs hit lossy entries
    pub fn assess_loss(&self, corpus: &Corpus) -> LossReport {
        let mut report = LossReport::new(&self.from_system, &self.to_system);
        for document in &corpus.documents {
            let Some(reference) = &document.canonical_ref else {
                continue;
            };
            let Some(mapping) = self.lookup(reference) else {
                continue;
            };
            match mapping.mapping_type {
                MappingType::Split => {
                    report.record_loss(
                        LossClass::L1,
                        &document.id,
                        "canonical_ref",
                        format!(
                            "{} splits into {} references; only {} kept",
                            reference,
                            mapping.to_refs.len().max(1),
                            mapping.to
                        ),
                    );
                }
                MappingType::Merge => {
                    report.record_loss(
                        LossClass::L1,
                        &document.id,
                        "canonical_ref",
                        format!("{} merges into {}", reference, mapping.to),
                    );
                }
                MappingType::Missing => {
                    report.record_loss(
                        LossClass::L3,
                        &document.id,
                        "canonical_ref",
                        format!("{} has no counterpart in {}", reference, self.to_system),
                    );
                }
                MappingType::Unknown(ref kind) => {
                    report.warn(format!(
                        "{}: unrecognized mapping type {:?} for {}",
                        document.id, kind, reference
                    ));
                }
                _ => {}
            }
        }
        report
    }

    /// [`apply_to_corpus`](Self::apply_to_corpus) with a report from
    /// [`assess_loss`](Self::assess_loss)
    pub fn apply_to_corpus_assessed(&self, corpus: &Corpus) -> (Corpus, LossReport) {
        let (mut mapped, _) = self.apply_to_corpus(corpus);
        let report = self.assess_loss(corpus);
        if !report.is_lossless() {
            mapped.loss_class = Some(report.loss_class.clone());
        }
        (mapped, report)
    }
}

/// Display form of a system pair. Not unique when system names contain `-`,
/// so lookups key on the pair itself.
pub fn table_key(from_system: &str, to_system: &str) -> String {
    format!("{}-{}", from_system, to_system)
}

/// All targets of a mapping: `to_refs` for splits, otherwise just `to`
pub fn split_ref(mapping: &RefMapping) -> Vec<Ref> {
    if mapping.mapping_type == MappingType::Split && !mapping.to_refs.is_empty() {
        mapping.to_refs.clone()
    } else {
        vec![mapping.to.clone()]
    }
}

/// Canonical representative of merged references: the first one
pub fn merge_refs(refs: &[Ref]) -> Option<Ref> {
    refs.first().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Document;

    fn psalms_table() -> MappingTable {
        MappingTable::new("kjv-lxx", "KJV", "LXX")
            .with_mapping(RefMapping::exact(Ref::new("Ps", 10, 1), Ref::new("Ps", 9, 22)))
            .with_mapping(RefMapping::new(
                Ref::new("Ps", 116, 10),
                Ref::new("Ps", 115, 1),
                MappingType::Split,
            ))
            .with_mapping(RefMapping::new(
                Ref::new("Ps", 147, 12),
                Ref::new("Ps", 147, 1),
                MappingType::Merge,
            ))
            .with_mapping(RefMapping::new(
                Ref::new("3John", 1, 15),
                Ref::default(),
                MappingType::Missing,
            ))
    }

    #[test]
    fn test_identity_mapping_lookup() {
        let table = MappingTable::new("id", "KJV", "KJV")
            .with_mapping(RefMapping::exact(Ref::new("Gen", 1, 1), Ref::new("Gen", 1, 1)));
        let mapping = table.lookup(&Ref::new("Gen", 1, 1)).unwrap();
        assert_eq!(mapping.to, Ref::new("Gen", 1, 1));
        assert_eq!(table.map_ref(&Ref::new("Gen", 1, 1)), Ref::new("Gen", 1, 1));
    }

    #[test]
    fn test_map_ref_falls_back_to_identity() {
        let table = psalms_table();
        let input = Ref::new("John", 3, 16);
        assert_eq!(table.map_ref(&input), input);
        assert!(table.resolve(&input).is_identity());
    }

    #[test]
    fn test_lookup_ignores_range_and_sub_id() {
        let table = psalms_table();
        let query = Ref::range("Ps", 10, 1, 4).with_sub_id("a");
        assert_eq!(table.map_ref(&query), Ref::new("Ps", 9, 22));
        assert_eq!(table.resolve(&query).kind, ResolutionKind::Exact);
    }

    #[test]
    fn test_split_and_merge_helpers() {
        let split = RefMapping::split(
            Ref::new("Ps", 116, 10),
            vec![Ref::new("Ps", 115, 1), Ref::new("Ps", 115, 2)],
        );
        assert_eq!(split.to, Ref::new("Ps", 115, 1));
        assert_eq!(split_ref(&split).len(), 2);

        let exact = RefMapping::exact(Ref::new("Gen", 1, 1), Ref::new("Gen", 1, 1));
        assert_eq!(split_ref(&exact), vec![Ref::new("Gen", 1, 1)]);

        let merged = merge_refs(&[Ref::new("Ps", 147, 1), Ref::new("Ps", 147, 12)]);
        assert_eq!(merged, Some(Ref::new("Ps", 147, 1)));
        assert_eq!(merge_refs(&[]), None);
    }

    #[test]
    fn test_apply_to_corpus_does_not_mutate_input() {
        let table = psalms_table();
        let mut corpus = Corpus::new("kjv");
        corpus.versification = "KJV".into();
        corpus.push_document(Document::new("ps10", "Psalm 10").with_ref(Ref::new("Ps", 10, 1)));
        corpus.push_document(Document::new("intro", "Introduction"));
        let original = corpus.clone();

        let (mapped, report) = table.apply_to_corpus(&corpus);

        assert_eq!(corpus, original);
        assert_eq!(mapped.versification, "LXX");
        assert_eq!(mapped.documents[0].canonical_ref, Some(Ref::new("Ps", 9, 22)));
        assert_eq!(mapped.documents[1].canonical_ref, None);
        assert_eq!(mapped.mapping_tables.len(), 1);
        assert_eq!(mapped.mapping_tables[0].id, "kjv-lxx");
        assert_eq!(report.loss_class, LossClass::L0);
        assert_eq!(report.source_format, "KJV");
        assert_eq!(report.target_format, "LXX");
    }

    #[test]
    fn test_apply_to_corpus_copies_blocks_and_annotations() {
        use crate::canonical::canonical_string;
        use crate::schema::{Annotation, AnnotationType, ContentBlock};

        let table = psalms_table();
        let mut corpus = Corpus::new("kjv");
        let mut doc = Document::new("ps10", "Psalm 10").with_ref(Ref::new("Ps", 10, 1));
        let mut block = ContentBlock::new("b0", 0, "Why standest thou afar off, O LORD?");
        block.tokenize();
        block.compute_hash();
        block.add_anchor("a0", 0);
        doc.push_block(block);
        doc.annotations
            .push(Annotation::new("n1", "v1", AnnotationType::Strongs, "H7350").with_confidence(0.9));
        corpus.push_document(doc);

        let (mapped, _) = table.apply_to_corpus(&corpus);
        let (before, after) = (&corpus.documents[0], &mapped.documents[0]);
        assert_eq!(
            canonical_string(&after.content_blocks).unwrap(),
            canonical_string(&before.content_blocks).unwrap()
        );
        assert_eq!(
            canonical_string(&after.annotations).unwrap(),
            canonical_string(&before.annotations).unwrap()
        );
    }

    #[test]
    fn test_assess_loss_downgrades() {
        let table = psalms_table();
        let mut corpus = Corpus::new("kjv");
        corpus.push_document(Document::new("a", "").with_ref(Ref::new("Ps", 116, 10)));
        let report = table.assess_loss(&corpus);
        assert_eq!(report.loss_class, LossClass::L1);

        corpus.push_document(Document::new("b", "").with_ref(Ref::new("3John", 1, 15)));
        let (mapped, report) = table.apply_to_corpus_assessed(&corpus);
        assert_eq!(report.loss_class, LossClass::L3);
        assert_eq!(report.lost_elements.len(), 2);
        assert_eq!(mapped.loss_class, Some(LossClass::L3));
    }

    #[test]
    fn test_table_json_shape() {
        let table = psalms_table();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["from_system"], "KJV");
        assert_eq!(json["mappings"][0]["type"], "exact");
        let back: MappingTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }
}
