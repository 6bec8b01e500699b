//! Accounts for NovelForge Sentinel.
//!
//! [`AccountService`] bootstraps the first administrator, creates accounts
//! along the role hierarchy, changes roles and resolves bearer tokens to
//! principals. [`UsageRecorder`] logs AI calls for accounts that hold an
//! active device binding.

mod error;
mod service;
pub mod token;
mod usage;

pub use error::{AccountError, AccountResult};
pub use service::{AccountService, IssuedAccount, NewAccount};
pub use usage::{UsageRecorder, UsageReport};
