//! PIN generation and the upgrade-request check.

use rand::Rng;

/// Returns a random 4-digit PIN, zero-padded.
pub fn generate_pin<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:04}", rng.gen_range(0..10_000u32))
}

/// Extracts the `pin` parameter from a request URI query string.
///
/// Percent-encoding is decoded.  The first `pin` wins.
pub fn pin_from_query(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "pin")
        .map(|(_, value)| value.into_owned())
}

/// Static comparison of the offered PIN with the configured one.
pub fn pin_matches(expected: &str, offered: Option<&str>) -> bool {
    match offered {
        Some(offered) => {
            // Compare every byte regardless of where the first mismatch is.
            expected.len() == offered.len()
                && expected
                    .bytes()
                    .zip(offered.bytes())
                    .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                    == 0
        }
        None => false,
    }
}
