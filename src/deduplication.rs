// 🔍 Deduplication Engine - Detect byte-identical duplicate rows
//
// A row's fingerprint is the SHA-256 of its CSV encoding, so two records
// match here exactly when they would be identical lines in the export.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

// ============================================================================
// DUPLICATE MATCH RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    /// Index of the first occurrence
    pub original_index: usize,

    /// Index of the later, duplicate row
    pub duplicate_index: usize,

    /// SHA-256 of the row's CSV bytes (hex)
    pub fingerprint: String,
}

// ============================================================================
// FINGERPRINTS
// ============================================================================

/// CSV encoding of one record (no header, trailing newline included)
pub fn row_bytes<T: Serialize>(record: &T) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .serialize(record)
        .context("Failed to encode row as CSV")?;

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV row: {}", e.error()))
}

pub fn row_fingerprint<T: Serialize>(record: &T) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(row_bytes(record)?);
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// DEDUPLICATION ENGINE
// ============================================================================

#[derive(Debug, Default)]
pub struct DeduplicationEngine;

impl DeduplicationEngine {
    pub fn new() -> Self {
        DeduplicationEngine
    }

    /// Every later row that is byte-identical to an earlier one
    pub fn find_exact_duplicates<T: Serialize>(&self, records: &[T]) -> Result<Vec<DuplicateMatch>> {
        let mut first_seen: HashMap<String, usize> = HashMap::with_capacity(records.len());
        let mut matches = Vec::new();

        for (i, record) in records.iter().enumerate() {
            let fingerprint = row_fingerprint(record)?;

            match first_seen.get(&fingerprint) {
                Some(&original_index) => matches.push(DuplicateMatch {
                    original_index,
                    duplicate_index: i,
                    fingerprint,
                }),
                None => {
                    first_seen.insert(fingerprint, i);
                }
            }
        }

        Ok(matches)
    }

    /// Indexes of rows that are not a repeat of an earlier row
    pub fn unique_indexes<T: Serialize>(&self, records: &[T]) -> Result<Vec<usize>> {
        let duplicates: HashSet<usize> = self
            .find_exact_duplicates(records)?
            .into_iter()
            .map(|m| m.duplicate_index)
            .collect();

        Ok((0..records.len())
            .filter(|i| !duplicates.contains(i))
            .collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Doctor, Patient, Specialty};

    #[test]
    fn test_exact_duplicate_detected() {
        let engine = DeduplicationEngine::new();
        let a = Doctor::new("Caio Rocha", Specialty::Neuro);
        let b = Doctor::new("Lucas Melo", Specialty::Ortopedia);
        let doctors = vec![a.clone(), b, a];

        let matches = engine.find_exact_duplicates(&doctors).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].original_index, 0);
        assert_eq!(matches[0].duplicate_index, 2);
        assert_eq!(matches[0].fingerprint.len(), 64);
    }

    #[test]
    fn test_null_and_empty_last_name_encode_alike() {
        let engine = DeduplicationEngine::new();
        let patients = vec![
            Patient::new("Ana".to_string(), None, "gmail.com"),
            Patient::new("Ana".to_string(), Some("".to_string()), "gmail.com"),
        ];

        // Same CSV bytes: null and empty string both encode to an empty field
        assert_eq!(
            row_bytes(&patients[0]).unwrap(),
            row_bytes(&patients[1]).unwrap()
        );
        assert_eq!(engine.find_exact_duplicates(&patients).unwrap().len(), 1);
    }

    #[test]
    fn test_unique_indexes_skip_later_copies() {
        let engine = DeduplicationEngine::new();
        let a = Doctor::new("Caio Rocha", Specialty::Neuro);
        let b = Doctor::new("Lucas Melo", Specialty::Ortopedia);
        let doctors = vec![a.clone(), b.clone(), a, b];

        assert_eq!(engine.unique_indexes(&doctors).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_no_duplicates_in_distinct_rows() {
        let engine = DeduplicationEngine::new();
        let doctors = vec![
            Doctor::new("Caio Rocha", Specialty::Neuro),
            Doctor::new("Caio Rocha", Specialty::Neurologia),
        ];

        assert!(engine.find_exact_duplicates(&doctors).unwrap().is_empty());
    }
}
