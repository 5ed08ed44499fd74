use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::family::{BloodStatus, KnownFamilies};
use super::image::image_key;
use crate::names::ParsedName;

/// Shown in place of a missing surname.
pub const UNKNOWN_SURNAME: &str = "(unknown)";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Unknown house: {0:?}")]
    UnknownHouse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum House {
    Gryffindor,
    Hufflepuff,
    Ravenclaw,
    Slytherin,
}

impl House {
    pub const ALL: [House; 4] = [
        House::Gryffindor,
        House::Hufflepuff,
        House::Ravenclaw,
        House::Slytherin,
    ];

    /// Parse roster text such as `" gryffinDOR "`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "gryffindor" => Some(House::Gryffindor),
            "hufflepuff" => Some(House::Hufflepuff),
            "ravenclaw" => Some(House::Ravenclaw),
            "slytherin" => Some(House::Slytherin),
            _ => None,
        }
    }

    /// Canonical lowercase key.
    pub fn as_str(&self) -> &'static str {
        match self {
            House::Gryffindor => "gryffindor",
            House::Hufflepuff => "hufflepuff",
            House::Ravenclaw => "ravenclaw",
            House::Slytherin => "slytherin",
        }
    }

    /// Capitalized name for display.
    pub fn title(&self) -> &'static str {
        match self {
            House::Gryffindor => "Gryffindor",
            House::Hufflepuff => "Hufflepuff",
            House::Ravenclaw => "Ravenclaw",
            House::Slytherin => "Slytherin",
        }
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Boy,
    Girl,
}

impl Gender {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "boy" => Some(Gender::Boy),
            "girl" => Some(Gender::Girl),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Boy => write!(f, "boy"),
            Gender::Girl => write!(f, "girl"),
        }
    }
}

/// Roster entry as served by the students endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStudent {
    pub fullname: String,
    pub house: String,
    #[serde(default)]
    pub gender: Option<String>,
}

/// Position of a record in its store. Records are never removed, so an id
/// stays valid for the life of the store that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(transparent)]
pub struct StudentId(pub usize);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A normalized student.
///
/// Names, house and derived attributes are fixed at construction. Role flags
/// are only changed through [`crate::RosterStore`], which keeps them
/// consistent with the role rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: StudentId,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub gender: Option<Gender>,
    pub house: House,
    pub blood_status: BloodStatus,
    pub image_key: String,
    pub(crate) is_expelled: bool,
    pub(crate) is_prefect: bool,
    pub(crate) is_squad_member: bool,
    pub(crate) is_privileged: bool,
}

impl StudentRecord {
    /// Normalize a raw roster entry. Name parsing never fails; only a house
    /// outside the four canonical houses is rejected.
    pub fn from_raw(
        id: StudentId,
        raw: &RawStudent,
        families: &KnownFamilies,
    ) -> Result<Self, RecordError> {
        let house =
            House::parse(&raw.house).ok_or_else(|| RecordError::UnknownHouse(raw.house.clone()))?;

        let name = ParsedName::parse(&raw.fullname);
        let blood_status = families.resolve(name.last.as_deref());
        let image_key = image_key(&name.first, name.last.as_deref());

        Ok(Self {
            id,
            first_name: name.first,
            middle_name: name.middle,
            last_name: name.last,
            nickname: name.nickname,
            gender: raw.gender.as_deref().and_then(Gender::parse),
            house,
            blood_status,
            image_key,
            is_expelled: false,
            is_prefect: false,
            is_squad_member: false,
            is_privileged: false,
        })
    }

    pub(crate) fn privileged(mut self) -> Self {
        self.is_privileged = true;
        self
    }

    pub fn is_expelled(&self) -> bool {
        self.is_expelled
    }

    pub fn is_prefect(&self) -> bool {
        self.is_prefect
    }

    pub fn is_squad_member(&self) -> bool {
        self.is_squad_member
    }

    pub fn is_privileged(&self) -> bool {
        self.is_privileged
    }

    /// Slytherins and pure-bloods may join the inquisitorial squad.
    pub fn is_squad_eligible(&self) -> bool {
        self.house == House::Slytherin || self.blood_status == BloodStatus::PureBlood
    }

    pub fn display_last_name(&self) -> &str {
        self.last_name.as_deref().unwrap_or(UNKNOWN_SURNAME)
    }

    pub fn full_name(&self) -> String {
        [
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
            Some(self.display_last_name()),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Portrait file name, e.g. `granger_h.png`.
    pub fn image_file(&self) -> String {
        format!("{}.png", self.image_key)
    }

    /// Lowercased first+middle+last with whitespace removed, or `None` when
    /// the surname is missing (such records never match a keyword).
    pub fn search_key(&self) -> Option<String> {
        let last = self.last_name.as_deref()?;
        let joined = [
            self.first_name.as_str(),
            self.middle_name.as_deref().unwrap_or(""),
            last,
        ]
        .concat();
        Some(
            joined
                .chars()
                .filter(|c| !c.is_whitespace())
                .flat_map(char::to_lowercase)
                .collect(),
        )
    }
}
