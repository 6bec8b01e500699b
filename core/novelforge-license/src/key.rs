//! License key generation.
//!
//! Keys have the form `NF-<time>-<random>`, uppercased, where `<time>` is
//! the issue time in unix milliseconds written in base 36 and `<random>` is
//! eight random bytes, each written as two base-36 digits.

use chrono::{DateTime, Utc};
use rand::RngCore;

/// Prefix of every generated key.
pub const KEY_PREFIX: &str = "NF";

/// Length of the random segment.
pub const RANDOM_SEGMENT_LEN: usize = 16;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a fresh key using the thread-local RNG.
#[must_use]
pub fn generate_license_key(now: DateTime<Utc>) -> String {
    generate_license_key_with(now, &mut rand::thread_rng())
}

/// Generates a key from an explicit RNG (for deterministic tests).
#[must_use]
pub fn generate_license_key_with<R: RngCore + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);

    let mut bytes = [0u8; RANDOM_SEGMENT_LEN / 2];
    rng.fill_bytes(&mut bytes);
    let random: String = bytes
        .iter()
        .map(|b| format!("{:0>2}", to_base36(u64::from(*b))))
        .collect();

    format!("{KEY_PREFIX}-{}-{random}", to_base36(millis)).to_uppercase()
}

/// Returns true if `key` has the shape produced by [`generate_license_key`].
#[must_use]
pub fn is_well_formed(key: &str) -> bool {
    let mut parts = key.split('-');
    let (Some(prefix), Some(time), Some(random), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let base36_upper = |s: &str| {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
    };
    prefix == KEY_PREFIX
        && base36_upper(time)
        && base36_upper(random)
        && random.len() == RANDOM_SEGMENT_LEN
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36_DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
