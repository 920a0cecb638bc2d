// Clinic CRM Fixtures - Core Library
// Synthetic CRM import files with counted data-quality defects,
// plus the CRM -> local database extraction path.

pub mod names;
pub mod entities;
pub mod linker;
pub mod defects;
pub mod deduplication;
pub mod data_quality;
pub mod generator;
pub mod export;
pub mod crm;
pub mod sink;
pub mod config;

// Re-export commonly used types
pub use names::{NameSource, PtBrNames};
pub use entities::{
    Doctor, Specialty, derive_domain, generate_doctors,
    Patient, build_email, is_valid_email, generate_patients,
    Deal, DealStage, StageSampler, STAGE_WEIGHTS,
};
pub use linker::{LinkStrategy, ReferentialLinker, PatientIndex, DoctorIndex};
pub use defects::{DefectConfig, DefectReport, DefectInjector};
pub use deduplication::{DeduplicationEngine, DuplicateMatch, row_fingerprint};
pub use data_quality::{DatasetAuditor, QualityReport, QualityIssue, Severity};
pub use generator::{Dataset, DatasetGenerator, RunMetadata};
pub use export::{export_dataset, write_manifest, ExportSummary, GenerationManifest};
pub use crm::{
    CrmObject, ExtractionPlan, FlatRecord, ObjectType, Page, PageSource, PagedRecords,
    SourceError, extract_all, flatten, get_all_records,
};
pub use sink::{load_tables, load_json_tables, open_database, LoadSummary};
pub use config::{CrmConfig, GeneratorConfig, StrategyKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
