//! Storage layer for NovelForge Sentinel.
//!
//! Defines the store traits the service crates are written against and a
//! SQLite implementation of all of them.
//!
//! # Architecture
//!
//! - [`LicenseStore`], [`BindingLedger`], [`SecurityEventLog`], [`UsageLog`],
//!   [`ProfileDirectory`] and [`NotificationOutbox`] are synchronous,
//!   object-safe traits.
//! - [`SqliteStore`] implements every trait over one mutex-guarded
//!   connection. Schema is created on open.
//! - Invariants spanning several rows (device cap, active-fingerprint
//!   uniqueness, single resolution, single bootstrap admin) are enforced
//!   inside the store with immediate transactions, conditional updates and a
//!   partial unique index.

mod error;
mod repository;
mod sqlite;

pub use error::{StorageError, StorageResult};
pub use repository::{
    BindOutcome, BindingLedger, LicenseStore, NotificationOutbox, ProfileDirectory,
    ResolveOutcome, SecurityEventLog, UsageLog,
};
pub use sqlite::SqliteStore;
