// ⚙️ Configuration - generator knobs and CRM credentials
//
// Generator defaults are 20 doctors, 50 patients and 100 deals; CRM settings come
// from the environment (a local .env is loaded first).

use crate::crm::SourceError;
use crate::defects::DefectConfig;
use crate::entities::STAGE_WEIGHTS;
use crate::linker::LinkStrategy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HUBSPOT_BASE_URL: &str = "https://api.hubapi.com";
pub const DEFAULT_DB_PATH: &str = "hubspot_raw.db";
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

// ============================================================================
// GENERATOR CONFIG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Patient and doctor sampled per deal; some deals lack a doctor
    Independent,

    /// Every patient gets a deal, some return; every deal has a doctor
    Recurrence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub doctors: usize,

    /// Unique patients (before duplicate rows are appended)
    pub patients: usize,

    pub deals: usize,

    pub strategy: StrategyKind,

    pub defects: DefectConfig,

    /// Relative weights of the 7 funnel stages
    pub stage_weights: [u32; 7],

    /// Fixed seed for reproducible runs; None = fresh entropy
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            doctors: 20,
            patients: 50,
            deals: 100,
            strategy: StrategyKind::Independent,
            defects: DefectConfig::default(),
            stage_weights: STAGE_WEIGHTS,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Doctor-less deals only exist under the independent strategy
    pub fn link_strategy(&self) -> LinkStrategy {
        match self.strategy {
            StrategyKind::Independent => LinkStrategy::Independent {
                doctorless_deals: self.defects.doctorless_deals,
            },
            StrategyKind::Recurrence => LinkStrategy::Recurrence,
        }
    }
}

// ============================================================================
// CRM CONFIG
// ============================================================================

#[derive(Clone, Deserialize)]
pub struct CrmConfig {
    pub access_token: String,
    pub base_url: String,
    pub db_path: String,
    pub page_limit: u32,
}

impl std::fmt::Debug for CrmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmConfig")
            .field("access_token", &"***")
            .field("base_url", &self.base_url)
            .field("db_path", &self.db_path)
            .field("page_limit", &self.page_limit)
            .finish()
    }
}

impl CrmConfig {
    /// Load `.env` (if any), then read the process environment
    pub fn from_env() -> Result<Self, SourceError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Fails before any request if the access token is missing or blank
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SourceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_token = lookup("HUBSPOT_ACCESS_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| SourceError::MissingCredential("HUBSPOT_ACCESS_TOKEN".to_string()))?;

        let base_url = lookup("HUBSPOT_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HUBSPOT_BASE_URL.to_string());

        let db_path = lookup("CRM_DB_PATH")
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        Ok(CrmConfig {
            access_token,
            base_url: base_url.trim_end_matches('/').to_string(),
            db_path,
            page_limit: DEFAULT_PAGE_LIMIT,
        })
    }
}
