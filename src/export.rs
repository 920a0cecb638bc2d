// 📤 Tabular Export - one CSV per entity, ready for CRM import
//
// Header = entity attribute list, no index column.
// Null values are written as empty fields, which read back as None.

use crate::defects::DefectReport;
use crate::entities::{Deal, Doctor, Patient};
use crate::generator::{Dataset, RunMetadata};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const COMPANIES_FILE: &str = "import_companies.csv";
pub const CONTACTS_FILE: &str = "import_contacts.csv";
pub const DEALS_FILE: &str = "import_deals.csv";
pub const MANIFEST_FILE: &str = "generation_report.json";

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub rows: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub files: Vec<ExportedFile>,
}

/// Write any serializable records under an explicit header
pub fn write_csv<T: Serialize>(path: &Path, header: &[&str], records: &[T]) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(header)?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }
    writer.flush()?;

    Ok(records.len())
}

/// Import order for the CRM: companies, contacts, deals
pub fn export_dataset(dataset: &Dataset, out_dir: &Path) -> Result<ExportSummary> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let mut summary = ExportSummary::default();

    let path = out_dir.join(COMPANIES_FILE);
    let rows = write_csv(&path, &Doctor::HEADER, &dataset.doctors)?;
    summary.files.push(ExportedFile { path, rows });

    let path = out_dir.join(CONTACTS_FILE);
    let rows = write_csv(&path, &Patient::HEADER, &dataset.patients)?;
    summary.files.push(ExportedFile { path, rows });

    let path = out_dir.join(DEALS_FILE);
    let rows = write_csv(&path, &Deal::header(dataset.company_column()), &dataset.deals)?;
    summary.files.push(ExportedFile { path, rows });

    for file in &summary.files {
        info!(path = %file.path.display(), rows = file.rows, "table exported");
    }

    Ok(summary)
}

// ============================================================================
// MANIFEST
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationManifest {
    #[serde(flatten)]
    pub run: RunMetadata,
    pub strategy: String,
    pub doctors: usize,
    pub patients: usize,
    pub deals: usize,
    pub defects: DefectReport,
}

impl GenerationManifest {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        GenerationManifest {
            run: dataset.run.clone(),
            strategy: dataset.strategy.name().to_string(),
            doctors: dataset.doctors.len(),
            patients: dataset.patients.len(),
            deals: dataset.deals.len(),
            defects: dataset.defects.clone(),
        }
    }
}

pub fn write_manifest(dataset: &Dataset, out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(MANIFEST_FILE);
    let manifest = GenerationManifest::from_dataset(dataset);
    let json = serde_json::to_string_pretty(&manifest)?;

    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeneratorConfig, StrategyKind};
    use crate::generator::DatasetGenerator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dataset(strategy: StrategyKind) -> Dataset {
        let mut rng = StdRng::seed_from_u64(12);
        let config = GeneratorConfig {
            strategy,
            ..GeneratorConfig::default()
        };
        DatasetGenerator::new(config).generate(&mut rng).unwrap()
    }

    #[test]
    fn test_export_writes_three_files_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dataset(StrategyKind::Independent);

        let summary = export_dataset(&dataset, dir.path()).unwrap();
        assert_eq!(summary.files.len(), 3);

        let mut reader = csv::Reader::from_path(dir.path().join(COMPANIES_FILE)).unwrap();
        assert_eq!(
            reader.headers().unwrap(),
            vec!["name", "domain", "especialidade_medica"]
        );
        assert_eq!(reader.records().count(), dataset.doctors.len());

        let mut reader = csv::Reader::from_path(dir.path().join(DEALS_FILE)).unwrap();
        assert_eq!(
            reader.headers().unwrap(),
            vec!["dealname", "amount", "pipeline", "dealstage", "contact_email", "company_domain"]
        );
    }

    #[test]
    fn test_recurrence_uses_associated_company_column() {
        let dir = tempfile::tempdir().unwrap();
        export_dataset(&dataset(StrategyKind::Recurrence), dir.path()).unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join(DEALS_FILE)).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.get(5), Some("associated_company_domain"));
    }

    #[test]
    fn test_nulls_round_trip() {
        for (strategy, doctorless) in [(StrategyKind::Independent, 10), (StrategyKind::Recurrence, 0)] {
            let dir = tempfile::tempdir().unwrap();
            let dataset = dataset(strategy);
            export_dataset(&dataset, dir.path()).unwrap();

            let mut reader = csv::Reader::from_path(dir.path().join(CONTACTS_FILE)).unwrap();
            let patients: Vec<Patient> = reader.deserialize().collect::<Result<_, _>>().unwrap();
            assert_eq!(patients, dataset.patients);
            assert_eq!(patients.iter().filter(|p| p.last_name.is_none()).count(), 8);

            let mut reader = csv::Reader::from_path(dir.path().join(DEALS_FILE)).unwrap();
            let deals: Vec<Deal> = reader.deserialize().collect::<Result<_, _>>().unwrap();
            assert_eq!(deals.iter().filter(|d| d.company_reference.is_none()).count(), doctorless);
            assert_eq!(deals, dataset.deals, "{:?}", strategy);
        }
    }

    #[test]
    fn test_manifest_contains_defects() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dataset(StrategyKind::Independent);

        let path = write_manifest(&dataset, dir.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(json["strategy"], "independent");
        assert_eq!(json["deals"], 100);
        assert_eq!(json["defects"]["missing_last_names"], 5);
        assert_eq!(json["defects"]["doctorless_deals"], 10);
        assert!(json["run_id"].is_string());
    }
}
