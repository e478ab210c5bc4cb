use chrono::NaiveDate;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

use crate::models::JobId;

static REFERENCE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Kenn-Nr\.\s*(\S+)").expect("valid regex"));

/// Pick the identifier for a listing entry: the printed reference number if
/// there is one, otherwise a hash of title and deadline.
pub fn job_id(raw_text: &str, title: &str, deadline: Option<NaiveDate>) -> JobId {
    match reference_number(raw_text) {
        Some(reference) => JobId::Reference(reference),
        None => JobId::Derived(derived_id(title, deadline)),
    }
}

pub fn reference_number(text: &str) -> Option<String> {
    REFERENCE_NUMBER
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Hex SHA-256 of the title followed by the ISO deadline, if any.
pub fn derived_id(title: &str, deadline: Option<NaiveDate>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    if let Some(deadline) = deadline {
        hasher.update(deadline.format("%Y-%m-%d").to_string().as_bytes());
    }
    hex::encode(hasher.finalize())
}
