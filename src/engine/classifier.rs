//! Address classification: Plus Code detection and landmark sniffing.
//!
//! Pure and deterministic — no I/O, no failure modes. Unstructured input
//! makes pattern sniffing inherent here, so the heuristics get an explicit
//! contract and direct unit tests.

use super::gazetteer::Gazetteer;

/// What a raw address string looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressClass {
    /// The Plus Code token leading the address, when present.
    pub plus_code: Option<String>,
    /// A landmark-table key contained in the address, when present.
    pub candidate_landmark: Option<String>,
}

impl AddressClass {
    pub fn is_plus_code(&self) -> bool {
        self.plus_code.is_some()
    }
}

/// Inspect a raw address string against the gazetteer's landmark keys.
pub fn classify(raw: &str, gazetteer: &Gazetteer) -> AddressClass {
    AddressClass {
        plus_code: plus_code_prefix(raw).map(str::to_string),
        candidate_landmark: gazetteer.landmark_match(raw).map(|(name, _)| name.to_string()),
    }
}

/// Extract a Plus Code leading the segment before the first comma:
/// 4-6 alphanumerics, `+`, 2-4 alphanumerics (e.g. `MWFJ+7X4`).
///
/// A prefix match: the local part is the greedy run of up to four
/// alphanumerics after the `+`, and anything past it is ignored.
/// Hand-rolled scan; one fixed pattern does not justify a regex engine.
pub fn plus_code_prefix(raw: &str) -> Option<&str> {
    let head = raw.split(',').next().unwrap_or("").trim();
    let token = head.split_whitespace().next()?;
    let plus = token.find('+')?;
    let area = &token[..plus];

    let is_code_char = |c: char| c.is_ascii_uppercase() || c.is_ascii_digit();
    if !(4..=6).contains(&area.len()) || !area.chars().all(is_code_char) {
        return None;
    }

    let local_run = token[plus + 1..]
        .chars()
        .take_while(|c| is_code_char(*c))
        .count();
    if local_run < 2 {
        return None;
    }

    // Code characters are all single-byte, so byte arithmetic is safe.
    Some(&token[..plus + 1 + local_run.min(4)])
}
