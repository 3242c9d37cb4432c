//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` + `Serialize` structs matching database rows or joined views
//! - `Deserialize` create DTOs for inserts
//! - `Deserialize` update DTOs (all `Option` fields) for patches
//!
//! Closed enums are stored as `TEXT`; rows carry them as `String` and the
//! service layer parses them into the core enums when it needs to branch.
//! All API-facing structs serialize with camelCase keys.

pub mod analytics;
pub mod booking;
pub mod event;
pub mod messaging;
pub mod notification;
pub mod portfolio;
pub mod profile;
pub mod review;
pub mod saved;
pub mod search;
pub mod user;
