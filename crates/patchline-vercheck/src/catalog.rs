//! Release catalog management.
//!
//! Loads and indexes release records from JSON for efficient querying.
//! The catalog is immutable after construction and safe for unbounded
//! concurrent readers.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

/// A product family whose releases are versioned independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// The bootstrapper executable line
    Boot,
    /// The main client line
    Game,
}

impl Family {
    /// All known families.
    pub const ALL: [Self; 2] = [Self::Boot, Self::Game];

    /// Lowercase family name used in paths and headers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boot => "boot",
            Self::Game => "game",
        }
    }

    /// Stable repository identifier for this family.
    ///
    /// First four bytes of SHA-256 over the family name, hex-encoded.
    /// Used as the top-level directory of artifact locations and in the
    /// `Content-Location` response header.
    #[must_use]
    pub fn repository_hash(self) -> String {
        let digest = Sha256::digest(self.name().as_bytes());
        hex::encode(&digest[..4])
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boot" => Ok(Self::Boot),
            "game" => Ok(Self::Game),
            other => Err(CatalogError::UnknownFamily(other.to_string())),
        }
    }
}

/// An ordered version token of dot-delimited numeric groups.
///
/// Equality is on the exact textual token; ordering compares the numeric
/// groups left to right (e.g. `2010.09.19.0000 < 2010.10.07.0001`).
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    groups: Vec<u64>,
}

impl Version {
    /// The textual form of the token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for Version {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CatalogError::InvalidVersion(s.to_string());

        if s.is_empty() {
            return Err(invalid());
        }

        let groups = s
            .split('.')
            .map(|group| {
                if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                group.parse::<u64>().map_err(|_| invalid())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: s.to_string(),
            groups,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Version {}

impl std::hash::Hash for Version {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.groups
            .cmp(&other.groups)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One published, timestamped release within a family.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReleaseRecord {
    /// Product family this release belongs to
    pub family: Family,

    /// Full version token (e.g. "2010.09.19.0000")
    pub version: Version,

    /// ISO 8601 timestamp of build creation.
    ///
    /// Stored textually; the fixed UTC format sorts lexicographically.
    pub build_time: String,

    /// Length in bytes of the patch payload for this release
    pub payload_length: u64,
}

/// Fixed build-time layout: `#` marks an ASCII digit, everything else is
/// matched literally. The `+00:00` offset is part of the pattern, so only
/// UTC timestamps are accepted.
const BUILD_TIME_PATTERN: &str = "####-##-##T##:##:##+00:00";

/// Check a build time against [`BUILD_TIME_PATTERN`].
///
/// Catalog ordering compares build times as plain strings, which is only
/// sound when every timestamp uses one fixed-width UTC spelling. A `Z`
/// suffix or a non-zero offset would sort by spelling, not instant, so
/// anything outside the exact pattern is rejected.
fn is_fixed_utc_timestamp(value: &str) -> bool {
    value.len() == BUILD_TIME_PATTERN.len()
        && value
            .bytes()
            .zip(BUILD_TIME_PATTERN.bytes())
            .all(|(byte, pattern)| match pattern {
                b'#' => byte.is_ascii_digit(),
                literal => byte == literal,
            })
}

impl ReleaseRecord {
    /// Validate all fields in the release record.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidRecord` if any field is invalid.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if !is_fixed_utc_timestamp(&self.build_time) {
            return Err(CatalogError::InvalidRecord {
                family: self.family,
                version: self.version.clone(),
                reason: format!(
                    "invalid build time: '{}' (expected fixed UTC format '2010-09-19T00:00:00+00:00')",
                    self.build_time
                ),
            });
        }

        Ok(())
    }
}

/// In-memory catalog of releases, indexed by family.
///
/// Read-only after construction; owns all its records exclusively.
#[derive(Debug)]
pub struct ReleaseCatalog {
    /// Releases indexed by family, ascending by build time
    releases_by_family: HashMap<Family, Vec<ReleaseRecord>>,

    /// Total number of releases
    total_releases: usize,
}

impl ReleaseCatalog {
    /// Load the catalog from a JSON file.
    ///
    /// The file contains a JSON array of `ReleaseRecord` objects.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read, the JSON is
    /// malformed, or the records fail [`Self::from_records`] validation.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path).map_err(|source| CatalogError::LoadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let reader = BufReader::new(file);
        let records: Vec<ReleaseRecord> = serde_json::from_reader(reader)?;

        Self::from_records(records)
    }

    /// Build the catalog from release records.
    ///
    /// Records are indexed by family and sorted ascending by build time.
    /// All invariants are enforced here, once, at load time; violations are
    /// configuration defects and never surface at request time.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the record set is empty, a record fails
    /// field validation, a (family, version) pair or per-family build time
    /// is duplicated, or build-time order disagrees with version order.
    pub fn from_records(records: Vec<ReleaseRecord>) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        for record in &records {
            record.validate()?;
        }

        let total_releases = records.len();

        let mut releases_by_family: HashMap<Family, Vec<ReleaseRecord>> = HashMap::new();
        for record in records {
            releases_by_family
                .entry(record.family)
                .or_default()
                .push(record);
        }

        for (family, releases) in &mut releases_by_family {
            releases.sort_by(|a, b| a.build_time.cmp(&b.build_time));

            let mut seen = HashSet::new();
            for record in releases.iter() {
                if !seen.insert(record.version.clone()) {
                    return Err(CatalogError::DuplicateRelease {
                        family: *family,
                        version: record.version.clone(),
                    });
                }
            }

            for pair in releases.windows(2) {
                if pair[0].build_time == pair[1].build_time {
                    return Err(CatalogError::DuplicateBuildTime {
                        family: *family,
                        build_time: pair[0].build_time.clone(),
                    });
                }
                if pair[0].version >= pair[1].version {
                    return Err(CatalogError::OrderInconsistent {
                        family: *family,
                        earlier: pair[0].version.clone(),
                        later: pair[1].version.clone(),
                    });
                }
            }
        }

        Ok(Self {
            releases_by_family,
            total_releases,
        })
    }

    /// Check whether an exact (family, version) pair is present.
    #[must_use]
    pub fn exists(&self, family: Family, version: &Version) -> bool {
        self.releases_by_family
            .get(&family)
            .is_some_and(|releases| releases.iter().any(|r| r.version == *version))
    }

    /// Get the release with the maximum build time in a family.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownFamily` if the family has no records.
    /// Given static configuration this is a fatal configuration error, not
    /// a request-time condition.
    pub fn latest(&self, family: Family) -> Result<&ReleaseRecord, CatalogError> {
        self.releases_by_family
            .get(&family)
            .and_then(|releases| releases.last())
            .ok_or_else(|| CatalogError::UnknownFamily(family.name().to_string()))
    }

    /// Get all releases of a family strictly newer than the given version,
    /// ascending by build time.
    ///
    /// The returned sequence excludes the queried version itself and
    /// contains no duplicates. Pure function of the immutable catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownVersion` if (family, version) is not
    /// present.
    pub fn updates_after(
        &self,
        family: Family,
        version: &Version,
    ) -> Result<Vec<&ReleaseRecord>, CatalogError> {
        let releases = self
            .releases_by_family
            .get(&family)
            .ok_or_else(|| CatalogError::UnknownFamily(family.name().to_string()))?;

        let base = releases
            .iter()
            .position(|r| r.version == *version)
            .ok_or_else(|| CatalogError::UnknownVersion {
                family,
                version: version.clone(),
            })?;

        Ok(releases[base + 1..].iter().collect())
    }

    /// Get all families with at least one release.
    #[must_use]
    pub fn families(&self) -> Vec<Family> {
        Family::ALL
            .into_iter()
            .filter(|family| self.releases_by_family.contains_key(family))
            .collect()
    }

    /// Get total number of releases loaded.
    #[must_use]
    pub const fn total_releases(&self) -> usize {
        self.total_releases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn version(s: &str) -> Version {
        s.parse().unwrap()
    }

    fn record(family: Family, v: &str, day: &str, payload_length: u64) -> ReleaseRecord {
        ReleaseRecord {
            family,
            version: version(v),
            build_time: format!("{day}T00:00:00+00:00"),
            payload_length,
        }
    }

    fn game_catalog() -> ReleaseCatalog {
        ReleaseCatalog::from_records(vec![
            record(Family::Game, "2010.07.10.0000", "2010-07-10", 0),
            record(Family::Game, "2010.09.19.0000", "2010-09-19", 444_398_866),
            record(Family::Game, "2010.09.23.0000", "2010-09-23", 6_907_277),
            record(Family::Boot, "2010.07.10.0000", "2010-07-10", 0),
        ])
        .unwrap()
    }

    #[test]
    fn test_version_ordering() {
        assert!(version("2010.09.19.0000") < version("2010.10.07.0001"));
        assert!(version("2010.09.19.0000") < version("2010.09.19.0001"));
        assert_eq!(version("2010.09.19.0000"), version("2010.09.19.0000"));
        // Equality is textual, ordering is numeric
        assert_ne!(version("1.0"), version("1.00"));
    }

    #[test]
    fn test_version_rejects_garbage() {
        assert!("".parse::<Version>().is_err());
        assert!("1..2".parse::<Version>().is_err());
        assert!("1.2.x".parse::<Version>().is_err());
        assert!("1.2.".parse::<Version>().is_err());
    }

    #[test]
    fn test_family_repository_hash_is_stable() {
        assert_eq!(Family::Boot.repository_hash().len(), 8);
        assert_eq!(Family::Boot.repository_hash(), Family::Boot.repository_hash());
        assert_ne!(Family::Boot.repository_hash(), Family::Game.repository_hash());
    }

    #[test]
    fn test_exists() {
        let catalog = game_catalog();
        assert!(catalog.exists(Family::Game, &version("2010.09.19.0000")));
        assert!(!catalog.exists(Family::Game, &version("9999.01.01.0000")));
        assert!(!catalog.exists(Family::Boot, &version("2010.09.19.0000")));
    }

    #[test]
    fn test_latest() {
        let catalog = game_catalog();
        let latest = catalog.latest(Family::Game).unwrap();
        assert_eq!(latest.version, version("2010.09.23.0000"));
    }

    #[test]
    fn test_updates_after_excludes_base_and_sorts() {
        let catalog = game_catalog();
        let chain = catalog
            .updates_after(Family::Game, &version("2010.07.10.0000"))
            .unwrap();

        let versions: Vec<&str> = chain.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, ["2010.09.19.0000", "2010.09.23.0000"]);
    }

    #[test]
    fn test_updates_after_latest_is_empty() {
        let catalog = game_catalog();
        let chain = catalog
            .updates_after(Family::Game, &version("2010.09.23.0000"))
            .unwrap();
        assert!(chain.is_empty());
    }

    #[test]
    fn test_updates_after_unknown_version() {
        let catalog = game_catalog();
        let err = catalog
            .updates_after(Family::Game, &version("9999.01.01.0000"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownVersion { .. }));
    }

    #[test]
    fn test_build_time_must_use_fixed_utc_format() {
        // String comparison of build times is only sound for one fixed
        // spelling; alternate ISO 8601 forms must be rejected at load
        for build_time in [
            "2010-09-19T00:00:00Z",
            "2010-09-19T00:00:00-05:00",
            "2010-09-19T00:00:00+0000",
            "2010-09-19 00:00:00+00:00",
            "2010-9-19T00:00:00+00:00",
        ] {
            let err = ReleaseCatalog::from_records(vec![ReleaseRecord {
                family: Family::Game,
                version: version("2010.09.19.0000"),
                build_time: build_time.to_string(),
                payload_length: 0,
            }])
            .unwrap_err();
            assert!(
                matches!(err, CatalogError::InvalidRecord { .. }),
                "expected '{build_time}' to be rejected"
            );
        }

        assert!(is_fixed_utc_timestamp("2010-09-19T00:00:00+00:00"));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let err = ReleaseCatalog::from_records(vec![]).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyCatalog));
    }

    #[test]
    fn test_duplicate_release_rejected() {
        let err = ReleaseCatalog::from_records(vec![
            record(Family::Game, "2010.07.10.0000", "2010-07-10", 0),
            record(Family::Game, "2010.07.10.0000", "2010-07-11", 1),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateRelease { .. }));
    }

    #[test]
    fn test_duplicate_build_time_rejected() {
        let err = ReleaseCatalog::from_records(vec![
            record(Family::Game, "2010.07.10.0000", "2010-07-10", 0),
            record(Family::Game, "2010.07.11.0000", "2010-07-10", 1),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateBuildTime { .. }));
    }

    #[test]
    fn test_order_inconsistency_rejected() {
        // Newer build time but older version token
        let err = ReleaseCatalog::from_records(vec![
            record(Family::Game, "2010.09.19.0000", "2010-07-10", 0),
            record(Family::Game, "2010.07.10.0000", "2010-09-19", 1),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::OrderInconsistent { .. }));
    }

    #[test]
    fn test_catalog_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let json = r#"[
            {"family":"game","version":"2010.07.10.0000","build_time":"2010-07-10T00:00:00+00:00","payload_length":0},
            {"family":"game","version":"2010.09.19.0000","build_time":"2010-09-19T00:00:00+00:00","payload_length":444398866}
        ]"#;
        temp_file.write_all(json.as_bytes()).unwrap();

        let catalog = ReleaseCatalog::from_file(temp_file.path()).unwrap();
        assert_eq!(catalog.total_releases(), 2);
        assert_eq!(catalog.families(), vec![Family::Game]);
    }

    #[test]
    fn test_catalog_from_file_empty_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[]").unwrap();

        let err = ReleaseCatalog::from_file(temp_file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyCatalog));
    }

    proptest! {
        /// For any set of releases, updates_after excludes the base version,
        /// yields no duplicates, and is sorted strictly ascending by build time.
        #[test]
        fn prop_updates_after_ordering(days in proptest::collection::btree_set(1u32..=28, 1..12), base_index in 0usize..12) {
            let records: Vec<ReleaseRecord> = days
                .iter()
                .map(|day| record(
                    Family::Game,
                    &format!("2010.01.{day:02}.0000"),
                    &format!("2010-01-{day:02}"),
                    u64::from(*day),
                ))
                .collect();
            let base = records[base_index % records.len()].version.clone();

            let catalog = ReleaseCatalog::from_records(records).unwrap();
            let chain = catalog.updates_after(Family::Game, &base).unwrap();

            prop_assert!(chain.iter().all(|r| r.version != base));
            for pair in chain.windows(2) {
                prop_assert!(pair[0].build_time < pair[1].build_time);
            }
        }
    }
}
