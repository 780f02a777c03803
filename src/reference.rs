//! Canonical scripture references

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, Result};

/// A canonical address: book, chapter, verse, and an optional verse range.
///
/// Zero means "not set" for `chapter`, `verse`, and `verse_end`, so `Gen` is a
/// whole book and `Gen.1` a whole chapter. Ordering is lexical on the book
/// name, then numeric on chapter and verse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ref {
    /// OSIS book abbreviation (e.g., "Gen", "1Kgs")
    pub book: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub chapter: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub verse: i32,
    /// Last verse of a range, inclusive
    #[serde(default, skip_serializing_if = "is_zero")]
    pub verse_end: i32,
    /// Sub-verse discriminator (e.g., "a" in Gen.1.1!a)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sub_id: String,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

fn ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<book>[1-4]?[A-Za-z][A-Za-z0-9]*)(?:[ .](?P<ch>\d+)(?:[.:](?P<v>\d+)(?:-(?P<ve>\d+))?)?)?(?:!(?P<sub>[A-Za-z0-9]+))?$",
        )
        .expect("reference pattern is a valid regex")
    })
}

impl Ref {
    /// Reference to a single verse
    pub fn new(book: impl Into<String>, chapter: i32, verse: i32) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse,
            ..Default::default()
        }
    }

    /// Reference to an inclusive verse range within one chapter
    pub fn range(book: impl Into<String>, chapter: i32, verse: i32, verse_end: i32) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse,
            verse_end,
            ..Default::default()
        }
    }

    /// Reference to a whole chapter
    pub fn chapter(book: impl Into<String>, chapter: i32) -> Self {
        Self::new(book, chapter, 0)
    }

    pub fn with_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sub_id = sub_id.into();
        self
    }

    /// Parse OSIS (`Gen.1.1-5`) or conventional (`Gen 1:1-5`) notation
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let caps = ref_pattern()
            .captures(input)
            .ok_or_else(|| IrError::InvalidRef(input.to_string()))?;

        let number = |name: &str| -> Result<i32> {
            match caps.name(name) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| IrError::InvalidRef(input.to_string())),
                None => Ok(0),
            }
        };

        Ok(Self {
            book: caps["book"].to_string(),
            chapter: number("ch")?,
            verse: number("v")?,
            verse_end: number("ve")?,
            sub_id: caps
                .name("sub")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        })
    }

    /// The (book, chapter, verse) triple used for exact-match mapping lookup
    pub fn verse_key(&self) -> (&str, i32, i32) {
        (&self.book, self.chapter, self.verse)
    }

    pub fn is_range(&self) -> bool {
        self.verse_end > self.verse
    }

    /// Last verse covered by this reference
    pub fn last_verse(&self) -> i32 {
        if self.is_range() {
            self.verse_end
        } else {
            self.verse
        }
    }

    /// Whether `other` lies entirely inside this reference
    pub fn contains(&self, other: &Ref) -> bool {
        if self.book != other.book {
            return false;
        }
        if self.chapter == 0 {
            return true;
        }
        if self.chapter != other.chapter {
            return false;
        }
        if self.verse == 0 {
            return true;
        }
        other.verse >= self.verse && other.last_verse() <= self.last_verse()
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.book)?;
        if self.chapter > 0 {
            write!(f, ".{}", self.chapter)?;
            if self.verse > 0 {
                write!(f, ".{}", self.verse)?;
                if self.is_range() {
                    write!(f, "-{}", self.verse_end)?;
                }
            }
        }
        if !self.sub_id.is_empty() {
            write!(f, "!{}", self.sub_id)?;
        }
        Ok(())
    }
}

impl FromStr for Ref {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_osis() {
        let r = Ref::parse("Gen.1.1").unwrap();
        assert_eq!(r, Ref::new("Gen", 1, 1));
        assert_eq!(r.to_string(), "Gen.1.1");
    }

    #[test]
    fn test_parse_conventional_range() {
        let r = Ref::parse("Ps 23:1-6").unwrap();
        assert_eq!(r, Ref::range("Ps", 23, 1, 6));
        assert_eq!(r.to_string(), "Ps.23.1-6");
    }

    #[test]
    fn test_parse_numbered_book_and_sub_id() {
        let r = Ref::parse("1Kgs.3.16!b").unwrap();
        assert_eq!(r.book, "1Kgs");
        assert_eq!(r.sub_id, "b");
        assert_eq!(r.to_string(), "1Kgs.3.16!b");
    }

    #[test]
    fn test_parse_chapter_and_book() {
        assert_eq!(Ref::parse("John.3").unwrap(), Ref::chapter("John", 3));
        assert_eq!(Ref::parse("Jude").unwrap().to_string(), "Jude");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Ref::parse("").is_err());
        assert!(Ref::parse("Gen:1:1:1").is_err());
        assert!(Ref::parse("Gen.99999999999").is_err());
    }

    #[test]
    fn test_ordering() {
        let mut refs = vec![Ref::new("Gen", 2, 1), Ref::new("Gen", 1, 10), Ref::new("Gen", 1, 2)];
        refs.sort();
        assert_eq!(refs[0], Ref::new("Gen", 1, 2));
        assert_eq!(refs[2], Ref::new("Gen", 2, 1));
    }

    #[test]
    fn test_contains() {
        let range = Ref::range("Matt", 5, 3, 12);
        assert!(range.contains(&Ref::new("Matt", 5, 3)));
        assert!(range.contains(&Ref::range("Matt", 5, 4, 6)));
        assert!(!range.contains(&Ref::new("Matt", 5, 13)));
        assert!(Ref::chapter("Matt", 5).contains(&Ref::new("Matt", 5, 48)));
        assert!(!Ref::chapter("Matt", 5).contains(&Ref::new("Matt", 6, 1)));
    }

    #[test]
    fn test_serialization_omits_unset_fields() {
        let json = serde_json::to_string(&Ref::new("Gen", 1, 1)).unwrap();
        assert_eq!(json, r#"{"book":"Gen","chapter":1,"verse":1}"#);
    }
}
