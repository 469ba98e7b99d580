//! Identifier and timestamp helpers.
//!
//! Ids are the current time in milliseconds (base 36) followed by a random
//! base-36 suffix, e.g. `lx3k9d2a` + `4f0q1z8c2`. Two ids minted in the same
//! millisecond collide only if their suffixes do, so uniqueness is
//! probabilistic. That is enough for hand-edited sites and nothing here
//! relies on it being stronger.

use chrono::{SecondsFormat, Utc};
use rand::Rng;

const SUFFIX_LEN: usize = 9;

/// Mint a new time-based id with a random suffix.
pub fn generate_id() -> String {
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| std::char::from_digit(rng.random_range(0..36), 36).unwrap_or('0'))
        .collect();
    format!("{}{}", to_base36(millis), suffix)
}

/// Current UTC time as an ISO-8601 string with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(std::char::from_digit((n % 36) as u32, 36).unwrap_or('0'));
        n /= 36;
    }
    digits.iter().rev().collect()
}
