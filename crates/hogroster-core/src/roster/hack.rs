//! The "1337" easter egg, layered over [`RosterStore`].
//!
//! Searching for the trigger keyword injects a privileged student who cannot
//! be expelled. From then on the inquisitorial squad does not stay together:
//! shortly after anyone joins, every non-privileged member is dropped again.

use std::ops::Deref;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::config::{HackConfig, DEFAULT_SQUAD_RESET_SECS};
use crate::models::{KnownFamilies, StudentId};

use super::error::RuleViolation;
use super::store::{Change, RosterStore};

pub struct HackedRoster {
    store: RosterStore,
    settings: HackConfig,
    hacker: Option<StudentId>,
    squad_reset_at: Option<DateTime<Utc>>,
}

impl HackedRoster {
    pub fn new(store: RosterStore, settings: HackConfig) -> Self {
        Self {
            store,
            settings,
            hacker: None,
            squad_reset_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.hacker.is_some()
    }

    /// The injected student, once active.
    pub fn hacker(&self) -> Option<StudentId> {
        self.hacker
    }

    pub fn is_trigger(&self, keyword: &str) -> bool {
        !self.settings.trigger.is_empty() && keyword.trim() == self.settings.trigger
    }

    /// Inject the privileged student. Only the first call does anything.
    pub fn activate(&mut self, now: DateTime<Utc>) -> Option<StudentId> {
        if self.hacker.is_some() {
            return None;
        }

        match self.store.insert_privileged(&self.settings.student()) {
            Ok(id) => {
                info!(student = %id, at = %now, "Roster hacked");
                self.hacker = Some(id);
                Some(id)
            }
            Err(e) => {
                warn!(error = %e, "Hack student could not be created");
                None
            }
        }
    }

    /// Drop the squad if a scheduled reset is due. Returns how many members
    /// were removed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> usize {
        match self.squad_reset_at {
            Some(due) if now >= due => {
                self.squad_reset_at = None;
                let removed = self.store.clear_squad();
                if removed > 0 {
                    info!(removed, "Inquisitorial squad reset");
                }
                removed
            }
            _ => 0,
        }
    }

    /// When the next squad reset is due, if one is scheduled.
    pub fn squad_reset_at(&self) -> Option<DateTime<Utc>> {
        self.squad_reset_at
    }

    pub fn toggle_expelled(&mut self, id: StudentId) -> Result<Change, RuleViolation> {
        self.store.toggle_expelled(id)
    }

    pub fn toggle_prefect(&mut self, id: StudentId) -> Result<Change, RuleViolation> {
        self.store.toggle_prefect(id)
    }

    pub fn toggle_squad_membership(&mut self, id: StudentId) -> Result<Change, RuleViolation> {
        self.toggle_squad_membership_at(id, Utc::now())
    }

    /// Toggle squad membership; while hacked, a join schedules a reset.
    pub fn toggle_squad_membership_at(
        &mut self,
        id: StudentId,
        now: DateTime<Utc>,
    ) -> Result<Change, RuleViolation> {
        let change = self.store.toggle_squad_membership(id)?;
        if self.is_active() && change == Change::SquadJoined && self.squad_reset_at.is_none() {
            self.squad_reset_at = Some(self.reset_due(now));
        }
        Ok(change)
    }

    /// `now` plus the configured delay. A delay chrono cannot represent falls
    /// back to the default.
    fn reset_due(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let secs = self.settings.squad_reset_secs;
        let due = i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|delay| now.checked_add_signed(delay));

        match due {
            Some(due) => due,
            None => {
                warn!(squad_reset_secs = secs, fallback = DEFAULT_SQUAD_RESET_SECS, "Squad reset delay out of range");
                now + Duration::seconds(DEFAULT_SQUAD_RESET_SECS as i64)
            }
        }
    }

    pub fn replace_families(&mut self, families: KnownFamilies) -> usize {
        self.store.replace_families(families)
    }
}

impl Deref for HackedRoster {
    type Target = RosterStore;

    fn deref(&self) -> &RosterStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{House, RawStudent};
    use crate::roster::{Filter, Query};

    fn roster() -> HackedRoster {
        let students = vec![
            RawStudent {
                fullname: "Draco Malfoy".into(),
                house: "Slytherin".into(),
                gender: Some("boy".into()),
            },
            RawStudent {
                fullname: "Pansy Parkinson".into(),
                house: "Slytherin".into(),
                gender: Some("girl".into()),
            },
        ];
        let store = RosterStore::load(&students, KnownFamilies::default());
        HackedRoster::new(store, HackConfig::default())
    }

    #[test]
    fn test_trigger() {
        let roster = roster();
        assert!(roster.is_trigger("1337"));
        assert!(roster.is_trigger(" 1337 "));
        assert!(!roster.is_trigger("133"));
    }

    #[test]
    fn test_activate_once() {
        let mut roster = roster();
        let now = Utc::now();
        let id = roster.activate(now).expect("first activation injects");
        assert_eq!(roster.len(), 3);
        assert!(roster.get(id).expect("hacker").is_privileged());
        assert_eq!(roster.activate(now), None);
        assert_eq!(roster.len(), 3);

        assert_eq!(roster.toggle_expelled(id), Err(RuleViolation::PermissionDenied));
        assert!(!roster.get(id).expect("hacker").is_expelled());
    }

    #[test]
    fn test_squad_reset_after_delay() {
        let mut roster = roster();
        let start = Utc::now();
        roster.activate(start);

        roster
            .toggle_squad_membership_at(StudentId(0), start)
            .expect("slytherin joins");
        roster
            .toggle_squad_membership_at(StudentId(1), start + Duration::seconds(1))
            .expect("slytherin joins");
        let due = roster.squad_reset_at().expect("reset scheduled");

        assert_eq!(roster.poll(due - Duration::milliseconds(1)), 0);
        assert_eq!(roster.poll(due), 2);
        assert_eq!(roster.squad_reset_at(), None);

        let squad = Query {
            filter: Filter::Inquisitor,
            ..Query::default()
        };
        assert!(squad.view(&roster).is_empty());
    }

    #[test]
    fn test_out_of_range_reset_delay_uses_default() {
        for secs in [u64::MAX, i64::MAX as u64, 1_000_000_000_000_000] {
            let settings = HackConfig {
                squad_reset_secs: secs,
                ..HackConfig::default()
            };
            let mut roster = HackedRoster::new(roster().store, settings);
            let now = Utc::now();
            roster.activate(now);

            roster
                .toggle_squad_membership_at(StudentId(0), now)
                .expect("slytherin joins");
            assert_eq!(
                roster.squad_reset_at(),
                Some(now + Duration::seconds(DEFAULT_SQUAD_RESET_SECS as i64))
            );
            assert_eq!(roster.poll(now + Duration::seconds(DEFAULT_SQUAD_RESET_SECS as i64)), 1);
        }
    }

    #[test]
    fn test_no_reset_before_activation() {
        let mut roster = roster();
        let now = Utc::now();
        roster.toggle_squad_membership_at(StudentId(0), now).expect("join");
        assert_eq!(roster.squad_reset_at(), None);
        assert_eq!(roster.poll(now + Duration::days(1)), 0);
        assert!(roster.get(StudentId(0)).expect("draco").is_squad_member());
    }

    #[test]
    fn test_hacker_keeps_squad_membership() {
        let mut roster = roster();
        let now = Utc::now();
        let hacker = roster.activate(now).expect("activate");
        assert_eq!(roster.get(hacker).map(|s| s.house), Some(House::Slytherin));

        roster.toggle_squad_membership_at(hacker, now).expect("hacker joins");
        roster.toggle_squad_membership_at(StudentId(0), now).expect("draco joins");
        let due = roster.squad_reset_at().expect("reset scheduled");

        assert_eq!(roster.poll(due), 1);
        assert!(roster.get(hacker).expect("hacker").is_squad_member());
    }
}
