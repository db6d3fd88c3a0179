//! Dedup key calculation for history records.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

/// Calculate the SHA-256 dedup key for a (funder, title, deadline) triple.
///
/// Funder and title are lowercased and trimmed before hashing so that
/// re-ingested listings with incidental whitespace or casing differences
/// still collapse onto the same record.
///
/// # Returns
/// Hexadecimal string representation of the SHA-256 hash.
pub fn record_key(funder: &str, title: &str, deadline: NaiveDate) -> String {
    let normalized = format!(
        "{}|{}|{}",
        funder.trim().to_lowercase(),
        title.trim().to_lowercase(),
        deadline
    );
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_key_consistency() {
        let key1 = record_key("NSF", "CAREER", date(2024, 3, 15));
        let key2 = record_key("NSF", "CAREER", date(2024, 3, 15));
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_key_normalizes_case_and_whitespace() {
        let key1 = record_key("  NSF ", "Career", date(2024, 3, 15));
        let key2 = record_key("nsf", "CAREER ", date(2024, 3, 15));
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_different_triples_different_keys() {
        let key1 = record_key("NSF", "CAREER", date(2024, 3, 15));
        let key2 = record_key("NSF", "CAREER", date(2024, 3, 16));
        let key3 = record_key("NIH", "CAREER", date(2024, 3, 15));
        assert_ne!(key1, key2);
        assert_ne!(key1, key3);
    }
}
