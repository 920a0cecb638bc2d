// ✅ Data Quality Audit - recount defects straight from the data
// Independent of the generator's own bookkeeping: if the audit and the
// DefectReport disagree, the fixture is not what it claims to be.

use crate::deduplication::DeduplicationEngine;
use crate::defects::DefectReport;
use crate::entities::{derive_domain, is_valid_email};
use crate::generator::Dataset;
use crate::linker::{DoctorIndex, PatientIndex};
use anyhow::Result;
use serde::{Deserialize, Serialize};

// ============================================================================
// ISSUES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // Breaks an invariant the fixture promises (bad email, dangling key)
    Warning,  // Injected defect a cleaning pipeline must handle
    Info,     // Cosmetic (spelling variants)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub table: String,
    pub field: String,
    pub count: usize,
    pub issue: String,
}

// ============================================================================
// QUALITY REPORT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityReport {
    pub doctor_rows: usize,
    pub patient_rows: usize,
    pub deal_rows: usize,

    pub duplicate_doctors: usize,
    pub duplicate_patients: usize,
    /// Counted over unique patient rows only
    pub missing_last_names: usize,
    /// Counted over unique doctor rows only
    pub inconsistent_specialties: usize,
    pub doctorless_deals: usize,

    pub invalid_emails: usize,
    pub underivable_domains: usize,
    pub dangling_contact_refs: usize,
    pub dangling_company_refs: usize,

    pub issues: Vec<QualityIssue>,
}

impl QualityReport {
    /// Defect counts in the same shape the generator reports them
    pub fn defect_counts(&self) -> DefectReport {
        DefectReport {
            duplicate_doctors: self.duplicate_doctors,
            duplicate_patients: self.duplicate_patients,
            missing_last_names: self.missing_last_names,
            inconsistent_specialties: self.inconsistent_specialties,
            doctorless_deals: self.doctorless_deals,
        }
    }

    pub fn matches(&self, report: &DefectReport) -> bool {
        self.defect_counts() == *report
    }

    pub fn has_critical_issues(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} doctors, {} patients, {} deals | {} issue(s) ({} critical)",
            self.doctor_rows,
            self.patient_rows,
            self.deal_rows,
            self.issues.len(),
            self.issues
                .iter()
                .filter(|i| i.severity == Severity::Critical)
                .count()
        )
    }
}

// ============================================================================
// AUDITOR
// ============================================================================

#[derive(Debug, Default)]
pub struct DatasetAuditor {
    dedup: DeduplicationEngine,
}

impl DatasetAuditor {
    pub fn new() -> Self {
        DatasetAuditor {
            dedup: DeduplicationEngine::new(),
        }
    }

    pub fn audit(&self, dataset: &Dataset) -> Result<QualityReport> {
        let mut report = QualityReport {
            doctor_rows: dataset.doctors.len(),
            patient_rows: dataset.patients.len(),
            deal_rows: dataset.deals.len(),
            ..QualityReport::default()
        };

        // Duplicates
        let unique_doctors = self.dedup.unique_indexes(&dataset.doctors)?;
        let unique_patients = self.dedup.unique_indexes(&dataset.patients)?;
        report.duplicate_doctors = dataset.doctors.len() - unique_doctors.len();
        report.duplicate_patients = dataset.patients.len() - unique_patients.len();

        // Per-row defects, on unique rows
        report.missing_last_names = unique_patients
            .iter()
            .filter(|&&i| dataset.patients[i].last_name.is_none())
            .count();
        report.inconsistent_specialties = unique_doctors
            .iter()
            .filter(|&&i| !dataset.doctors[i].specialty.is_canonical())
            .count();
        report.doctorless_deals = dataset
            .deals
            .iter()
            .filter(|d| d.company_reference.is_none())
            .count();

        // Invariants
        report.invalid_emails = dataset
            .patients
            .iter()
            .filter(|p| !is_valid_email(&p.email))
            .count();
        report.underivable_domains = dataset
            .doctors
            .iter()
            .filter(|d| derive_domain(&d.name) != d.domain)
            .count();

        // Referential integrity
        let patients = PatientIndex::build(&dataset.patients);
        let doctors = DoctorIndex::build(&dataset.doctors);
        report.dangling_contact_refs = dataset
            .deals
            .iter()
            .filter(|d| patients.get(&d.contact_reference).is_none())
            .count();
        report.dangling_company_refs = dataset
            .deals
            .iter()
            .filter_map(|d| d.company_reference.as_deref())
            .filter(|domain| doctors.get(domain).is_none())
            .count();

        report.issues = Self::collect_issues(&report, dataset.company_column());
        Ok(report)
    }

    fn collect_issues(report: &QualityReport, company_column: &str) -> Vec<QualityIssue> {
        let candidates = [
            (report.duplicate_doctors, Severity::Warning, "companies", "*", "Exact duplicate rows"),
            (report.duplicate_patients, Severity::Warning, "contacts", "*", "Exact duplicate rows"),
            (report.missing_last_names, Severity::Warning, "contacts", "lastname", "Missing last name"),
            (
                report.inconsistent_specialties,
                Severity::Info,
                "companies",
                "especialidade_medica",
                "Non-canonical specialty spelling",
            ),
            (report.doctorless_deals, Severity::Warning, "deals", company_column, "Deal without doctor"),
            (report.invalid_emails, Severity::Critical, "contacts", "email", "Malformed email address"),
            (
                report.underivable_domains,
                Severity::Critical,
                "companies",
                "domain",
                "Domain not derivable from name",
            ),
            (
                report.dangling_contact_refs,
                Severity::Critical,
                "deals",
                "contact_email",
                "Contact reference has no patient",
            ),
            (
                report.dangling_company_refs,
                Severity::Critical,
                "deals",
                company_column,
                "Company reference has no doctor",
            ),
        ];

        candidates
            .into_iter()
            .filter(|(count, ..)| *count > 0)
            .map(|(count, severity, table, field, issue)| QualityIssue {
                severity,
                table: table.to_string(),
                field: field.to_string(),
                count,
                issue: issue.to_string(),
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
