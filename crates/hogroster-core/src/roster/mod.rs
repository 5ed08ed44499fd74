//! Roster state, role rules and queries.
//!
//! - `RosterStore`: owns the records and enforces prefect, squad and
//!   expulsion rules
//! - `Query`: filter/search/sort producing the view to render
//! - `HackedRoster`: optional easter-egg decorator over the store

pub mod error;
pub mod hack;
pub mod query;
pub mod store;

pub use error::{ResultCode, RuleViolation};
pub use hack::HackedRoster;
pub use query::{view, Filter, Query, SortDirection, SortKey, SortState};
pub use store::{Change, HouseCounts, RosterCounts, RosterEvent, RosterStore, PREFECTS_PER_HOUSE};
