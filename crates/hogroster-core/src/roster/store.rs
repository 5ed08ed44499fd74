//! The authoritative in-memory roster and its role rules.
//!
//! Every role change goes through [`RosterStore`]. A change either applies in
//! full (and is published on the revision channel and recorded in the
//! history) or is refused with a [`RuleViolation`] and leaves the roster
//! untouched.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::RosterSources;
use crate::models::{House, KnownFamilies, RawStudent, RecordError, StudentId, StudentRecord};

use super::error::RuleViolation;
use super::query::Filter;

/// Maximum number of prefects per house.
pub const PREFECTS_PER_HOUSE: usize = 2;

/// An applied role change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Change {
    Expelled,
    PrefectAppointed,
    PrefectRevoked,
    SquadJoined,
    SquadLeft,
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Expelled => write!(f, "expelled"),
            Change::PrefectAppointed => write!(f, "appointed prefect"),
            Change::PrefectRevoked => write!(f, "no longer prefect"),
            Change::SquadJoined => write!(f, "joined the inquisitorial squad"),
            Change::SquadLeft => write!(f, "left the inquisitorial squad"),
        }
    }
}

/// History entry for an applied change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEvent {
    pub at: DateTime<Utc>,
    pub student: StudentId,
    pub change: Change,
}

/// Member counts per house.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseCounts {
    pub active: usize,
    pub expelled: usize,
}

/// Aggregate counts for filter badges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterCounts {
    pub total: usize,
    pub active: usize,
    pub expelled: usize,
    pub prefects: usize,
    pub squad: usize,
    pub houses: BTreeMap<House, HouseCounts>,
}

impl RosterCounts {
    /// Number of students a filter would show before keyword search.
    pub fn for_filter(&self, filter: &Filter) -> usize {
        match filter {
            Filter::All => self.total,
            Filter::House(house) => self.houses.get(house).map(|h| h.active).unwrap_or(0),
            Filter::NonExpelled => self.active,
            Filter::Expelled => self.expelled,
            Filter::Prefect => self.prefects,
            Filter::Inquisitor => self.squad,
        }
    }
}

pub struct RosterStore {
    students: Vec<StudentRecord>,
    families: KnownFamilies,
    history: Vec<RosterEvent>,
    revision: watch::Sender<u64>,
}

impl RosterStore {
    /// Build the roster from raw entries. Rows with an unrecognized house are
    /// skipped so every stored record has a canonical house.
    pub fn load(raw: &[RawStudent], families: KnownFamilies) -> Self {
        let (revision, _) = watch::channel(0);
        let mut store = Self {
            students: Vec::with_capacity(raw.len()),
            families,
            history: Vec::new(),
            revision,
        };

        for entry in raw {
            if let Err(e) = store.insert(entry) {
                warn!(fullname = %entry.fullname, error = %e, "Skipping roster entry");
            }
        }

        info!(students = store.students.len(), skipped = raw.len() - store.students.len(), "Roster loaded");
        store
    }

    pub fn from_sources(sources: RosterSources) -> Self {
        Self::load(&sources.students, sources.families)
    }

    /// Normalize and append one entry.
    pub fn insert(&mut self, raw: &RawStudent) -> Result<StudentId, RecordError> {
        let id = StudentId(self.students.len());
        let record = StudentRecord::from_raw(id, raw, &self.families)?;
        self.students.push(record);
        Ok(id)
    }

    /// Append an entry that cannot be expelled.
    pub(crate) fn insert_privileged(&mut self, raw: &RawStudent) -> Result<StudentId, RecordError> {
        let id = StudentId(self.students.len());
        let record = StudentRecord::from_raw(id, raw, &self.families)?.privileged();
        self.students.push(record);
        self.bump();
        Ok(id)
    }

    // ===== Lookups =====

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    pub fn get(&self, id: StudentId) -> Option<&StudentRecord> {
        self.students.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Find a student by full name, ignoring case and extra whitespace.
    pub fn find_by_name(&self, name: &str) -> Option<&StudentRecord> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        self.students
            .iter()
            .find(|s| normalize_name(&s.full_name()) == wanted)
    }

    pub fn families(&self) -> &KnownFamilies {
        &self.families
    }

    pub fn history(&self) -> &[RosterEvent] {
        &self.history
    }

    /// Current revision; bumped after every applied change.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receive a signal whenever the roster changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn counts(&self) -> RosterCounts {
        let mut counts = RosterCounts {
            houses: House::ALL.iter().map(|h| (*h, HouseCounts::default())).collect(),
            ..RosterCounts::default()
        };

        for student in &self.students {
            counts.total += 1;
            let house = counts.houses.entry(student.house).or_default();
            if student.is_expelled {
                counts.expelled += 1;
                house.expelled += 1;
            } else {
                counts.active += 1;
                house.active += 1;
            }
            if student.is_prefect {
                counts.prefects += 1;
            }
            if student.is_squad_member {
                counts.squad += 1;
            }
        }

        counts
    }

    // ===== Mutations =====

    /// Expel a student. Irreversible; clears prefect and squad roles.
    pub fn toggle_expelled(&mut self, id: StudentId) -> Result<Change, RuleViolation> {
        let student = self.student_mut(id)?;
        if student.is_privileged || student.is_expelled {
            debug!(student = %id, "Expulsion refused");
            return Err(RuleViolation::PermissionDenied);
        }

        student.is_expelled = true;
        student.is_prefect = false;
        student.is_squad_member = false;
        Ok(self.commit(id, Change::Expelled))
    }

    /// Appoint or revoke a prefect. Revoking always succeeds; appointing
    /// respects the per-house quota and gender balance.
    pub fn toggle_prefect(&mut self, id: StudentId) -> Result<Change, RuleViolation> {
        let (house, gender, is_prefect) = {
            let student = self.student(id)?;
            if student.is_expelled {
                return Err(RuleViolation::PermissionDenied);
            }
            (student.house, student.gender, student.is_prefect)
        };

        if is_prefect {
            self.students[id.0].is_prefect = false;
            return Ok(self.commit(id, Change::PrefectRevoked));
        }

        let prefects: Vec<&StudentRecord> = self
            .students
            .iter()
            .filter(|s| s.house == house && s.is_prefect && !s.is_expelled)
            .collect();

        if prefects.len() >= PREFECTS_PER_HOUSE {
            return Err(RuleViolation::QuotaExceeded { house });
        }
        if let Some(other) = prefects.iter().find(|p| p.gender == gender) {
            return Err(RuleViolation::SameGenderConflict {
                house,
                other: other.id,
            });
        }

        self.students[id.0].is_prefect = true;
        Ok(self.commit(id, Change::PrefectAppointed))
    }

    /// Add or remove a student from the inquisitorial squad.
    pub fn toggle_squad_membership(&mut self, id: StudentId) -> Result<Change, RuleViolation> {
        let student = self.student_mut(id)?;
        if student.is_expelled {
            return Err(RuleViolation::PermissionDenied);
        }
        if !student.is_squad_eligible() {
            return Err(RuleViolation::NotEligible);
        }

        student.is_squad_member = !student.is_squad_member;
        let change = if student.is_squad_member {
            Change::SquadJoined
        } else {
            Change::SquadLeft
        };
        Ok(self.commit(id, change))
    }

    /// Remove every non-privileged student from the squad. Returns how many
    /// were removed.
    pub(crate) fn clear_squad(&mut self) -> usize {
        let ids: Vec<StudentId> = self
            .students
            .iter()
            .filter(|s| s.is_squad_member && !s.is_privileged)
            .map(|s| s.id)
            .collect();

        for id in &ids {
            self.students[id.0].is_squad_member = false;
            self.record(*id, Change::SquadLeft);
        }
        if !ids.is_empty() {
            self.bump();
        }
        ids.len()
    }

    /// Install new family reference data and re-derive every blood status.
    /// Squad members who are no longer eligible lose their membership.
    pub fn replace_families(&mut self, families: KnownFamilies) -> usize {
        self.families = families;

        let mut revoked = Vec::new();
        for student in &mut self.students {
            student.blood_status = self.families.resolve(student.last_name.as_deref());
            if student.is_squad_member && !student.is_squad_eligible() {
                student.is_squad_member = false;
                revoked.push(student.id);
            }
        }
        for id in &revoked {
            self.record(*id, Change::SquadLeft);
        }

        info!(revoked = revoked.len(), "Family reference data replaced");
        self.bump();
        revoked.len()
    }

    // ===== Internals =====

    fn student(&self, id: StudentId) -> Result<&StudentRecord, RuleViolation> {
        self.students.get(id.0).ok_or(RuleViolation::UnknownStudent(id))
    }

    fn student_mut(&mut self, id: StudentId) -> Result<&mut StudentRecord, RuleViolation> {
        self.students.get_mut(id.0).ok_or(RuleViolation::UnknownStudent(id))
    }

    fn record(&mut self, id: StudentId, change: Change) {
        info!(student = %id, change = %change, "Roster change applied");
        self.history.push(RosterEvent {
            at: Utc::now(),
            student: id,
            change,
        });
    }

    fn bump(&mut self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn commit(&mut self, id: StudentId, change: Change) -> Change {
        self.record(id, change);
        self.bump();
        change
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ============================================================================
// Tests
// ============================================================================
