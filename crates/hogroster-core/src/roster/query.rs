//! Filter, keyword search and sort over the roster.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{House, StudentRecord};

use super::store::RosterStore;

/// Which students a view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Filter {
    #[default]
    All,
    /// Non-expelled members of one house.
    House(House),
    NonExpelled,
    Expelled,
    /// Prefects, including any that were expelled after appointment.
    Prefect,
    /// Squad members, regardless of expulsion.
    Inquisitor,
}

impl Filter {
    /// Parse a filter key. Unknown keys fall back to showing everyone.
    pub fn parse(key: &str) -> Self {
        let key = key.trim().to_lowercase();
        match key.as_str() {
            "*" | "" | "all" => Filter::All,
            "non-expelled" => Filter::NonExpelled,
            "expelled" => Filter::Expelled,
            "prefect" => Filter::Prefect,
            "inquisitor" => Filter::Inquisitor,
            other => match House::parse(other) {
                Some(house) => Filter::House(house),
                None => {
                    debug!(filter = %other, "Unknown filter, showing everyone");
                    Filter::All
                }
            },
        }
    }

    pub fn matches(&self, student: &StudentRecord) -> bool {
        match self {
            Filter::All => true,
            Filter::House(house) => student.house == *house && !student.is_expelled(),
            Filter::NonExpelled => !student.is_expelled(),
            Filter::Expelled => student.is_expelled(),
            Filter::Prefect => student.is_prefect(),
            Filter::Inquisitor => student.is_squad_member(),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => write!(f, "*"),
            Filter::House(house) => write!(f, "{}", house),
            Filter::NonExpelled => write!(f, "non-expelled"),
            Filter::Expelled => write!(f, "expelled"),
            Filter::Prefect => write!(f, "prefect"),
            Filter::Inquisitor => write!(f, "inquisitor"),
        }
    }
}

// Sorting options for the student table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    FirstName,
    LastName,
    House,
    BloodStatus,
}

impl SortKey {
    /// Parse a sort key. Unknown keys mean "no reordering".
    pub fn parse(key: &str) -> Option<Self> {
        let parsed = match key.trim().to_lowercase().as_str() {
            "firstname" | "first" => Some(SortKey::FirstName),
            "lastname" | "last" => Some(SortKey::LastName),
            "house" => Some(SortKey::House),
            "bloodstatus" | "blood" => Some(SortKey::BloodStatus),
            _ => None,
        };
        if parsed.is_none() {
            debug!(sort = %key, "Unknown sort key, keeping roster order");
        }
        parsed
    }

    /// The string a student is compared by. A missing surname compares as
    /// the empty string.
    fn value<'a>(&self, student: &'a StudentRecord) -> &'a str {
        match self {
            SortKey::FirstName => &student.first_name,
            SortKey::LastName => student.last_name.as_deref().unwrap_or(""),
            SortKey::House => student.house.as_str(),
            SortKey::BloodStatus => student.blood_status.as_str(),
        }
    }

    fn compare(&self, a: &StudentRecord, b: &StudentRecord) -> Ordering {
        self.value(a).cmp(self.value(b))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::FirstName => write!(f, "firstName"),
            SortKey::LastName => write!(f, "lastName"),
            SortKey::House => write!(f, "house"),
            SortKey::BloodStatus => write!(f, "bloodStatus"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Current sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortState {
    /// Toggle sort column - if already sorting by this column, flip direction;
    /// otherwise switch to it ascending.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == Some(key) {
            self.direction = self.direction.toggle();
        } else {
            self.key = Some(key);
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Everything that shapes the rendered view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub filter: Filter,
    pub keyword: String,
    pub sort: SortState,
}

impl Query {
    pub fn view<'a>(&self, store: &'a RosterStore) -> Vec<&'a StudentRecord> {
        view(
            store.students(),
            &self.filter,
            &self.keyword,
            self.sort.key,
            self.sort.direction,
        )
    }
}

/// Filter, then keyword-match, then sort.
///
/// The sort is stable and ascending; descending is that exact order
/// reversed, so flipping the direction twice gives back the same list.
pub fn view<'a>(
    students: &'a [StudentRecord],
    filter: &Filter,
    keyword: &str,
    sort: Option<SortKey>,
    direction: SortDirection,
) -> Vec<&'a StudentRecord> {
    let mut result: Vec<&StudentRecord> = students.iter().filter(|s| filter.matches(s)).collect();

    let needle = search_needle(keyword);
    if !needle.is_empty() {
        result.retain(|s| matches_keyword(s, &needle));
    }

    if let Some(key) = sort {
        result.sort_by(|a, b| key.compare(a, b));
        if direction == SortDirection::Descending {
            result.reverse();
        }
    }

    result
}

fn search_needle(keyword: &str) -> String {
    keyword
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Needle should already be lowercased with whitespace removed.
fn matches_keyword(student: &StudentRecord, needle: &str) -> bool {
    student
        .search_key()
        .map(|key| key.contains(needle))
        .unwrap_or(false)
}

// ============================================================================
// Tests
// ============================================================================
