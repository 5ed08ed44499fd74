use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::names::capitalize;

/// Lineage classification derived from the surname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "kebab-case")]
pub enum BloodStatus {
    PureBlood,
    HalfBlood,
    MuggleBorn,
}

impl BloodStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodStatus::PureBlood => "pure-blood",
            BloodStatus::HalfBlood => "half-blood",
            BloodStatus::MuggleBorn => "muggle-born",
        }
    }
}

impl fmt::Display for BloodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Family reference payload as served: `{"pure": [...], "half": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFamilies {
    #[serde(default)]
    pub pure: Vec<String>,
    #[serde(default)]
    pub half: Vec<String>,
}

/// Known pure-blood and half-blood surnames, normalized for lookup.
#[derive(Debug, Clone, Default)]
pub struct KnownFamilies {
    pure: HashSet<String>,
    half: HashSet<String>,
}

impl KnownFamilies {
    pub fn new<P, H>(pure: P, half: H) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        H: IntoIterator,
        H::Item: AsRef<str>,
    {
        let families = Self {
            pure: surname_set(pure),
            half: surname_set(half),
        };
        if families.is_empty() {
            warn!("No known families supplied, every student resolves to muggle-born");
        }
        families
    }

    pub fn is_empty(&self) -> bool {
        self.pure.is_empty() && self.half.is_empty()
    }

    /// Classify a surname. Half-blood wins over pure-blood when a family is
    /// listed in both; unknown or absent surnames are muggle-born.
    pub fn resolve(&self, last_name: Option<&str>) -> BloodStatus {
        let Some(last) = last_name else {
            return BloodStatus::MuggleBorn;
        };
        let last = capitalize(last);

        if self.half.contains(&last) {
            BloodStatus::HalfBlood
        } else if self.pure.contains(&last) {
            BloodStatus::PureBlood
        } else {
            BloodStatus::MuggleBorn
        }
    }
}

fn surname_set<I>(names: I) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names
        .into_iter()
        .map(|s| capitalize(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect()
}

impl From<RawFamilies> for KnownFamilies {
    fn from(raw: RawFamilies) -> Self {
        Self::new(raw.pure, raw.half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn families() -> KnownFamilies {
        KnownFamilies::new(["Malfoy", "Black", "Potter"], ["Weasley", "Potter", "Abbott"])
    }

    #[test]
    fn test_resolve_scenarios() {
        let families = families();
        assert_eq!(families.resolve(Some("Malfoy")), BloodStatus::PureBlood);
        assert_eq!(families.resolve(Some("Weasley")), BloodStatus::HalfBlood);
        assert_eq!(families.resolve(Some("Granger")), BloodStatus::MuggleBorn);
    }

    #[test]
    fn test_resolve_both_lists_is_half_blood() {
        // Potter is listed as both pure and half.
        assert_eq!(families().resolve(Some("Potter")), BloodStatus::HalfBlood);
    }

    #[test]
    fn test_resolve_absent_surname() {
        assert_eq!(families().resolve(None), BloodStatus::MuggleBorn);
    }

    #[test]
    fn test_resolve_normalizes_case() {
        let families = KnownFamilies::new([" malfoy "], Vec::<String>::new());
        assert_eq!(families.resolve(Some("MALFOY")), BloodStatus::PureBlood);
    }

    #[test]
    fn test_missing_reference_data() {
        let families = KnownFamilies::default();
        assert!(families.is_empty());
        assert_eq!(families.resolve(Some("Malfoy")), BloodStatus::MuggleBorn);
    }

    #[test]
    fn test_parse_raw_families() {
        let json = r#"{"half": ["Abbott", "Bones"], "pure": ["Boot", "Cornfoot"]}"#;
        let raw: RawFamilies = serde_json::from_str(json).expect("Failed to parse families JSON");
        let families = KnownFamilies::from(raw);
        assert_eq!(families.resolve(Some("Bones")), BloodStatus::HalfBlood);
        assert_eq!(families.resolve(Some("Boot")), BloodStatus::PureBlood);

        let partial: RawFamilies = serde_json::from_str(r#"{"pure": ["Boot"]}"#)
            .expect("Failed to parse partial families JSON");
        assert!(partial.half.is_empty());
    }

    #[test]
    fn test_blood_status_display() {
        assert_eq!(BloodStatus::PureBlood.to_string(), "pure-blood");
        assert_eq!(
            serde_json::to_string(&BloodStatus::MuggleBorn).expect("serialize"),
            "\"muggle-born\""
        );
    }
}
