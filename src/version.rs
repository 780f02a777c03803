//! IR schema versioning

use semver::Version;
use std::fmt;

use crate::error::{IrError, Result};
use crate::schema::Corpus;

/// IR schema version written by this build
pub const IR_VERSION: &str = "1.0.0";

/// A parsed IR schema version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IrVersion {
    pub version: Version,
}

impl IrVersion {
    /// The version this build writes
    pub fn current() -> Self {
        Self {
            version: Version::new(1, 0, 0),
        }
    }

    /// Parse a version string, accepting a leading 'v'
    pub fn parse(version_str: &str) -> Result<Self> {
        let version_str = version_str.strip_prefix('v').unwrap_or(version_str);
        let version = Version::parse(version_str)?;
        Ok(Self { version })
    }

    /// Same major version means the encodings are interchangeable
    pub fn is_compatible_with(&self, other: &IrVersion) -> bool {
        self.version.major == other.version.major
    }
}

impl fmt::Display for IrVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}

/// Check that a corpus was written against an IR version this build reads.
/// There is no migration; an incompatible corpus is reported, not converted.
pub fn check_corpus_version(corpus: &Corpus) -> Result<IrVersion> {
    let found = IrVersion::parse(&corpus.version)
        .map_err(|_| IrError::InvalidVersion(corpus.version.clone()))?;
    let supported = IrVersion::current();
    if !found.is_compatible_with(&supported) {
        return Err(IrError::IncompatibleVersion {
            found: found.to_string(),
            supported: supported.to_string(),
        });
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_matches_constant() {
        assert_eq!(IrVersion::current().to_string(), IR_VERSION);
    }

    #[test]
    fn test_version_with_v_prefix() {
        let v = IrVersion::parse("v1.2.3").unwrap();
        assert_eq!(v.to_string(), "1.2.3");
    }

    #[test]
    fn test_check_corpus_version() {
        let mut corpus = Corpus::new("c");
        assert!(check_corpus_version(&corpus).is_ok());

        corpus.version = "1.4.0".into();
        assert!(check_corpus_version(&corpus).is_ok());

        corpus.version = "2.0.0".into();
        assert!(matches!(
            check_corpus_version(&corpus),
            Err(IrError::IncompatibleVersion { .. })
        ));

        corpus.version = "one".into();
        assert!(matches!(
            check_corpus_version(&corpus),
            Err(IrError::InvalidVersion(_))
        ));
    }
}
