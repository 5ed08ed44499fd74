//! Data models for the roster.
//!
//! - `StudentRecord`, `RawStudent`: normalized and wire-format students
//! - `House`, `Gender`: closed sets parsed from roster text
//! - `KnownFamilies`, `BloodStatus`: lineage reference data and its verdicts
//! - `image_key`: portrait lookup keys

pub mod family;
pub mod image;
pub mod student;

pub use family::{BloodStatus, KnownFamilies, RawFamilies};
pub use image::image_key;
pub use student::{Gender, House, RawStudent, RecordError, StudentId, StudentRecord};
