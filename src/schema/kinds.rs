//! Enumerated kinds used across the IR
//!
//! Every kind serializes as its wire string. Values outside the declared set
//! decode into `Unknown` so a corpus written by a newer or buggy producer still
//! loads; validation reports them instead of deserialization failing.

use std::fmt;

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value outside the declared set
            Unknown(String),
        }

        impl $name {
            /// All declared values, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire string for this value
            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $text, )+
                    $name::Unknown(s) => s,
                }
            }

            /// Whether this is one of the declared values
            pub fn is_known(&self) -> bool {
                !matches!(self, $name::Unknown(_))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $( $text => $name::$variant, )+
                    other => $name::Unknown(other.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from(s.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                <String as ::serde::Deserialize>::deserialize(deserializer).map(Self::from)
            }
        }
    };
}

string_enum! {
    /// Kind of module a corpus represents
    ModuleType {
        Bible => "BIBLE",
        Commentary => "COMMENTARY",
        Dictionary => "DICTIONARY",
        GenBook => "GENBOOK",
        Devotional => "DEVOTIONAL",
    }
}

string_enum! {
    /// Structural kind of a span
    SpanType {
        Verse => "VERSE",
        Chapter => "CHAPTER",
        Paragraph => "PARAGRAPH",
        PoetryLine => "POETRY_LINE",
        Quotation => "QUOTATION",
        /// Words of Christ
        RedLetter => "RED_LETTER",
        Note => "NOTE",
        CrossRef => "CROSS_REF",
        Section => "SECTION",
        Title => "TITLE",
        DivineName => "DIVINE_NAME",
        Emphasis => "EMPHASIS",
        Foreign => "FOREIGN",
        Selah => "SELAH",
    }
}

string_enum! {
    /// Kind of data an annotation carries
    AnnotationType {
        Strongs => "STRONGS",
        Morphology => "MORPHOLOGY",
        Footnote => "FOOTNOTE",
        CrossRef => "CROSS_REF",
        Gloss => "GLOSS",
        Source => "SOURCE",
        Alternate => "ALTERNATE",
        Variant => "VARIANT",
    }
}

string_enum! {
    /// Classification of a token
    TokenType {
        Word => "word",
        Whitespace => "whitespace",
        Punctuation => "punctuation",
    }
}

string_enum! {
    /// How a source reference relates to its target in another versification
    MappingType {
        Exact => "exact",
        /// One source verse becomes several target verses
        Split => "split",
        /// Several source verses become one target verse
        Merge => "merge",
        /// The source verse has no target
        Missing => "missing",
        /// The target verse has no source
        Added => "added",
        Reordered => "reordered",
    }
}

string_enum! {
    /// Coarse fidelity rating for a conversion. Declaration order runs from
    /// lossless to most lossy, so `Ord` compares severity.
    LossClass {
        L0 => "L0",
        L1 => "L1",
        L2 => "L2",
        L3 => "L3",
        L4 => "L4",
    }
}

impl LossClass {
    pub fn description(&self) -> &'static str {
        match self {
            LossClass::L0 => "lossless",
            LossClass::L1 => "semantically lossless, structure regrouped",
            LossClass::L2 => "presentation or markup lost",
            LossClass::L3 => "content lost",
            LossClass::L4 => "severe loss, output not representative",
            LossClass::Unknown(_) => "unknown loss class",
        }
    }
}

/// Decode an optional kind, treating an empty string the same as an absent field
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: ::serde::Deserializer<'de>,
    T: From<String>,
{
    let raw = <Option<String> as ::serde::Deserialize>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(T::from))
}

impl Default for LossClass {
    fn default() -> Self {
        LossClass::L0
    }
}

impl Default for TokenType {
    fn default() -> Self {
        TokenType::Word
    }
}

impl Default for MappingType {
    fn default() -> Self {
        MappingType::Exact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_strings() {
        assert_eq!(SpanType::PoetryLine.as_str(), "POETRY_LINE");
        assert_eq!(TokenType::from("word"), TokenType::Word);
        assert_eq!(MappingType::from("split"), MappingType::Split);
        assert_eq!(SpanType::ALL.len(), 14);
        assert_eq!(AnnotationType::ALL.len(), 8);
        assert_eq!(ModuleType::ALL.len(), 5);
    }

    #[test]
    fn test_unknown_values_roundtrip() {
        let t: ModuleType = serde_json::from_str(r#""ATLAS""#).unwrap();
        assert_eq!(t, ModuleType::Unknown("ATLAS".into()));
        assert!(!t.is_known());
        assert_eq!(serde_json::to_string(&t).unwrap(), r#""ATLAS""#);
    }

    #[test]
    fn test_loss_class_severity_order() {
        assert!(LossClass::L0 < LossClass::L1);
        assert!(LossClass::L3 < LossClass::L4);
        assert_eq!(LossClass::default(), LossClass::L0);
    }
}
