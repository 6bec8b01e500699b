//! Licensing for NovelForge Sentinel.
//!
//! - [`LicenseVerifier`]: answers "may this device run?" for a fingerprint.
//! - [`DeviceBinder`]: attaches a device to a license within its device cap,
//!   and releases bindings.
//! - [`LicenseIssuer`]: generates, updates and inspects licenses on behalf of
//!   resellers and admins.
//!
//! All services are generic over the store traits from
//! `novelforge-storage` and hold the store behind an `Arc`.

mod binder;
mod error;
mod issuer;
pub mod key;
mod verifier;

pub use binder::{BindReceipt, BindRequest, DeviceBinder};
pub use error::{LicenseError, LicenseResult};
pub use issuer::{GenerateLicenses, LicenseInfo, LicenseIssuer, MAX_BATCH};
pub use key::{generate_license_key, is_well_formed};
pub use verifier::{
    LicenseVerifier, MSG_LICENSE_EXPIRED, MSG_LICENSE_INACTIVE, MSG_NOT_REGISTERED, MSG_VERIFIED,
    Verification,
};
