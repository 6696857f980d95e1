//! Principal-side entities: users, teams and the application singleton.
//!
//! # Responsibility
//! - Define the fixture shapes for `User`, `Team` and `Application`.
//! - Own the `parents` edge edits used by share/unshare.
//!
//! # Invariants
//! - `parents` keeps insertion order; sharing appends, unsharing removes the
//!   first match (see `remove_shared_parent`).
//! - Identifiers are never rewritten after construction.

use crate::model::uid::{EntityType, Uid};
use serde::{Deserialize, Serialize};

/// Application identifier used by the bundled fixture.
pub const DEFAULT_APPLICATION_ID: &str = "TinyTodo";

/// Human principal loaded from the entity fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub euid: Uid,
    pub location: String,
    #[serde(rename = "joblevel")]
    pub job_level: i64,
    #[serde(default)]
    pub parents: Vec<Uid>,
}

impl User {
    pub fn new(euid: Uid, location: impl Into<String>, job_level: i64) -> Self {
        Self {
            euid,
            location: location.into(),
            job_level,
            parents: Vec::new(),
        }
    }
}

/// Group entity; either a fixture team or a List's reader/editor team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub uid: Uid,
    #[serde(default)]
    pub parents: Vec<Uid>,
}

impl Team {
    pub fn new(uid: Uid) -> Self {
        Self {
            uid,
            parents: Vec::new(),
        }
    }
}

/// Whole-system resource for application-wide actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub euid: Uid,
}

impl Application {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            euid: Uid::new(EntityType::Application, id),
        }
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new(DEFAULT_APPLICATION_ID)
    }
}

/// Appends a sharing edge. Duplicates are kept, matching repeated shares.
pub fn append_parent(parents: &mut Vec<Uid>, parent: Uid) {
    parents.push(parent);
}

/// Removes the first occurrence of `parent` from `parents`.
///
/// A match at position zero is left in place and reported as not removed.
/// Unshare has always behaved this way; tests pin it.
///
/// Returns whether an edge was removed.
pub fn remove_shared_parent(parents: &mut Vec<Uid>, parent: &Uid) -> bool {
    match parents.iter().position(|candidate| candidate == parent) {
        Some(index) if index > 0 => {
            parents.remove(index);
            true
        }
        _ => false,
    }
}
