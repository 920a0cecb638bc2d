// 🏭 Dataset Generator - one generation run, end to end
//
// Entity generators -> referential linker -> post-hoc duplicates.
// The resulting Dataset carries the exact defect counts of the run.

use crate::config::GeneratorConfig;
use crate::defects::{DefectInjector, DefectReport};
use crate::entities::{generate_doctors, generate_patients, Deal, Doctor, Patient, StageSampler};
use crate::linker::{LinkStrategy, ReferentialLinker};
use crate::names::{NameSource, PtBrNames};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub seed: Option<u64>,
}

impl RunMetadata {
    pub fn new(seed: Option<u64>) -> Self {
        RunMetadata {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            seed,
        }
    }
}

/// The three entity collections of one run, plus what was injected
#[derive(Debug, Clone)]
pub struct Dataset {
    pub run: RunMetadata,
    pub strategy: LinkStrategy,
    pub doctors: Vec<Doctor>,
    pub patients: Vec<Patient>,
    pub deals: Vec<Deal>,
    pub defects: DefectReport,
}

impl Dataset {
    pub fn company_column(&self) -> &'static str {
        self.strategy.company_column()
    }
}

pub struct DatasetGenerator<N: NameSource = PtBrNames> {
    config: GeneratorConfig,
    names: N,
}

impl DatasetGenerator<PtBrNames> {
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_names(config, PtBrNames)
    }
}

impl<N: NameSource> DatasetGenerator<N> {
    pub fn with_names(config: GeneratorConfig, names: N) -> Self {
        DatasetGenerator { config, names }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run with the configured seed, or fresh entropy when there is none
    pub fn run(&self) -> Result<Dataset> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.generate(&mut rng)
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Dataset> {
        let config = &self.config;
        let defects = &config.defects;
        let strategy = config.link_strategy();

        if strategy == LinkStrategy::Recurrence && defects.doctorless_deals > 0 {
            warn!(
                requested = defects.doctorless_deals,
                "recurrence strategy always links a doctor; doctor-less deals ignored"
            );
        }

        let mut doctors = generate_doctors(rng, &self.names, config.doctors, defects.specialty_skew);
        let mut patients =
            generate_patients(rng, &self.names, config.patients, defects.missing_last_names);

        let linker = ReferentialLinker::new(strategy, StageSampler::new(config.stage_weights)?);
        let deals = linker.link(rng, &doctors, &patients, config.deals);

        let mut report = DefectReport::from_generated(&doctors, &patients, &deals);
        report.duplicate_doctors = DefectInjector::append_duplicates(&mut doctors, defects.duplicate_doctors);
        report.duplicate_patients =
            DefectInjector::append_duplicates(&mut patients, defects.duplicate_patients);

        info!(
            doctors = doctors.len(),
            patients = patients.len(),
            deals = deals.len(),
            strategy = strategy.name(),
            defects = report.total(),
            "dataset generated"
        );

        Ok(Dataset {
            run: RunMetadata::new(config.seed),
            strategy,
            doctors,
            patients,
            deals,
            defects: report,
        })
    }
}
