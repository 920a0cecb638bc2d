// 🧪 Defect Injector - deliberate, counted data-quality problems
//
// Inline defects happen while generating (missing last names, specialty
// skew, deals without doctor). Post-hoc defects append verbatim copies of
// existing rows. Every category is counted in a DefectReport.

use crate::entities::{Deal, Doctor, Patient};
use serde::{Deserialize, Serialize};

// ============================================================================
// DEFECT CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectConfig {
    /// Verbatim doctor copies appended after generation
    pub duplicate_doctors: usize,

    /// Verbatim patient copies appended after generation
    pub duplicate_patients: usize,

    /// Patients generated without last name
    pub missing_last_names: usize,

    /// Deals without company reference (independent strategy only)
    pub doctorless_deals: usize,

    /// 10% of doctors forced to Cardiologia
    pub specialty_skew: bool,
}

impl Default for DefectConfig {
    fn default() -> Self {
        DefectConfig {
            duplicate_doctors: 1,
            duplicate_patients: 3,
            missing_last_names: 5,
            doctorless_deals: 10,
            specialty_skew: true,
        }
    }
}

impl DefectConfig {
    /// Clean dataset: no defect of any kind requested
    pub fn none() -> Self {
        DefectConfig {
            duplicate_doctors: 0,
            duplicate_patients: 0,
            missing_last_names: 0,
            doctorless_deals: 0,
            specialty_skew: false,
        }
    }
}

// ============================================================================
// DEFECT REPORT
// ============================================================================

/// Exact number of defects present in a generated dataset, per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectReport {
    pub duplicate_doctors: usize,
    pub duplicate_patients: usize,
    pub missing_last_names: usize,
    pub inconsistent_specialties: usize,
    pub doctorless_deals: usize,
}

impl DefectReport {
    /// Count inline defects from freshly generated (not yet duplicated) rows
    pub fn from_generated(doctors: &[Doctor], patients: &[Patient], deals: &[Deal]) -> Self {
        DefectReport {
            duplicate_doctors: 0,
            duplicate_patients: 0,
            missing_last_names: patients.iter().filter(|p| p.last_name.is_none()).count(),
            inconsistent_specialties: doctors
                .iter()
                .filter(|d| !d.specialty.is_canonical())
                .count(),
            doctorless_deals: deals.iter().filter(|d| d.company_reference.is_none()).count(),
        }
    }

    pub fn total(&self) -> usize {
        self.duplicate_doctors
            + self.duplicate_patients
            + self.missing_last_names
            + self.inconsistent_specialties
            + self.doctorless_deals
    }

    /// One line per category, for the operator summary
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("{} duplicate doctor row(s)", self.duplicate_doctors),
            format!(
                "{} doctor(s) with a non-canonical specialty spelling (e.g. 'Neuro' vs 'Neurologia')",
                self.inconsistent_specialties
            ),
            format!("{} duplicate patient row(s)", self.duplicate_patients),
            format!("{} patient(s) missing last name", self.missing_last_names),
            format!("{} deal(s) without associated doctor", self.doctorless_deals),
        ]
    }
}

// ============================================================================
// POST-HOC INJECTION
// ============================================================================

pub struct DefectInjector;

impl DefectInjector {
    /// Append `count` verbatim copies of the leading records (cycling when
    /// `count` exceeds the length). Returns how many rows were appended.
    pub fn append_duplicates<T: Clone>(records: &mut Vec<T>, count: usize) -> usize {
        let original_len = records.len();
        if original_len == 0 {
            return 0;
        }

        for i in 0..count {
            let copy = records[i % original_len].clone();
            records.push(copy);
        }

        count
    }
}
