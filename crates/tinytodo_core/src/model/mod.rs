//! Domain model for the task-list entity graph.
//!
//! # Responsibility
//! - Define the canonical identifier and its text codec.
//! - Define users, teams, lists, tasks and the application singleton.
//!
//! # Invariants
//! - Every entity is identified by exactly one typed `Uid`.
//! - Group membership is expressed only through `parents` edges.

pub mod action;
pub mod entity;
pub mod list;
pub mod role;
pub mod uid;
