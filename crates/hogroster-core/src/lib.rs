//! Core library for hogroster.
//!
//! Turns the raw student roster and the known-family reference lists into
//! normalized [`StudentRecord`]s, enforces the role rules (prefects, squad
//! membership, expulsion) and answers filter/sort/search queries.
//!
//! - `api`: fetches the two JSON sources
//! - `config`: data source locations and easter-egg tuning
//! - `names`: full-name parsing and capitalization
//! - `models`: student records, houses, blood status, image keys
//! - `roster`: the store, the query engine and the hack decorator

pub mod api;
pub mod config;
pub mod models;
pub mod names;
pub mod roster;

pub use api::{ApiError, RosterClient, RosterSources};
pub use config::Config;
pub use models::{
    BloodStatus, Gender, House, KnownFamilies, RawFamilies, RawStudent, RecordError,
    StudentId, StudentRecord,
};
pub use names::ParsedName;
pub use roster::{
    Change, Filter, HackedRoster, Query, ResultCode, RosterCounts, RosterEvent, RosterStore,
    RuleViolation, SortDirection, SortKey, SortState,
};
