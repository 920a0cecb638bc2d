// 💼 Deal Entity - links a Patient (contact) to a Doctor (company)
//
// Stage is drawn with fixed relative weights to look like a real funnel:
// more deals at the top, fewer closed, a fat "lost" bucket.

use anyhow::{Context, Result};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const PIPELINE_LABEL: &str = "Pipeline de vendas";
pub const DEAL_NAME_PREFIX: &str = "Atendimento - ";
pub const MIN_AMOUNT: f64 = 100.0;
pub const MAX_AMOUNT: f64 = 800.0;

/// Relative weights, same order as `DealStage::ALL`
pub const STAGE_WEIGHTS: [u32; 7] = [20, 18, 15, 12, 10, 8, 17];

// ============================================================================
// DEAL STAGE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DealStage {
    #[serde(rename = "Compromisso agendado")]
    AppointmentScheduled,

    #[serde(rename = "Qualificado para comprar")]
    QualifiedToBuy,

    #[serde(rename = "Apresentação agendada")]
    PresentationScheduled,

    #[serde(rename = "Tomador de decisão envolvido")]
    DecisionMakerBoughtIn,

    #[serde(rename = "Contrato enviado")]
    ContractSent,

    #[serde(rename = "Negócio fechado")]
    ClosedWon,

    #[serde(rename = "Negócio perdido")]
    ClosedLost,
}

impl DealStage {
    pub const ALL: [DealStage; 7] = [
        DealStage::AppointmentScheduled,
        DealStage::QualifiedToBuy,
        DealStage::PresentationScheduled,
        DealStage::DecisionMakerBoughtIn,
        DealStage::ContractSent,
        DealStage::ClosedWon,
        DealStage::ClosedLost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::AppointmentScheduled => "Compromisso agendado",
            DealStage::QualifiedToBuy => "Qualificado para comprar",
            DealStage::PresentationScheduled => "Apresentação agendada",
            DealStage::DecisionMakerBoughtIn => "Tomador de decisão envolvido",
            DealStage::ContractSent => "Contrato enviado",
            DealStage::ClosedWon => "Negócio fechado",
            DealStage::ClosedLost => "Negócio perdido",
        }
    }
}

/// Weighted draw over the 7 funnel stages
#[derive(Debug, Clone)]
pub struct StageSampler {
    index: WeightedIndex<u32>,
}

impl StageSampler {
    /// Weights are relative; they do not need to sum to anything
    pub fn new(weights: [u32; 7]) -> Result<Self> {
        let index = WeightedIndex::new(weights)
            .context("Stage weights must be non-negative with a non-zero total")?;

        Ok(StageSampler { index })
    }

    pub fn funnel() -> Result<Self> {
        Self::new(STAGE_WEIGHTS)
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> DealStage {
        DealStage::ALL[self.index.sample(rng)]
    }
}

// ============================================================================
// DEAL ENTITY
// ============================================================================

/// Column order in `import_deals.csv` follows field order; the header of the
/// last column depends on the linking strategy (see `Deal::header`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    #[serde(rename = "dealname")]
    pub name: String,

    pub amount: f64,

    pub pipeline: String,

    #[serde(rename = "dealstage")]
    pub stage: DealStage,

    /// Foreign key to Patient.email
    #[serde(rename = "contact_email")]
    pub contact_reference: String,

    /// Foreign key to Doctor.domain (None = deal without doctor).
    /// Recurrence files name the column `associated_company_domain`.
    #[serde(rename = "company_domain", alias = "associated_company_domain")]
    pub company_reference: Option<String>,
}

impl Deal {
    pub fn new(
        patient_first_name: &str,
        amount: f64,
        stage: DealStage,
        contact_reference: String,
        company_reference: Option<String>,
    ) -> Self {
        Deal {
            name: format!("{}{}", DEAL_NAME_PREFIX, patient_first_name),
            amount,
            pipeline: PIPELINE_LABEL.to_string(),
            stage,
            contact_reference,
            company_reference,
        }
    }

    /// CSV header; `company_column` names the company reference column
    pub fn header(company_column: &str) -> [&str; 6] {
        [
            "dealname",
            "amount",
            "pipeline",
            "dealstage",
            "contact_email",
            company_column,
        ]
    }
}

/// Uniform in [100, 800], rounded to cents
pub fn draw_amount<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let raw: f64 = rng.gen_range(MIN_AMOUNT..=MAX_AMOUNT);
    (raw * 100.0).round() / 100.0
}
