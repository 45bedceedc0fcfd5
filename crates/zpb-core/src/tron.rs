use std::sync::OnceLock;

use regex::Regex;

static TRON_ADDRESS_RE: OnceLock<Regex> = OnceLock::new();

/// TRON base58 address: `T` followed by 33 characters from the base58
/// alphabet (which excludes the confusable `0`, `I`, `O`, `l`).
///
/// This is a format check only; a string that fails it never reaches the
/// remote API.
pub fn is_tron_address(s: &str) -> bool {
    let re = TRON_ADDRESS_RE
        .get_or_init(|| Regex::new(r"^T[1-9A-HJ-NP-Za-km-z]{33}$").expect("valid regex"));
    re.is_match(s)
}
