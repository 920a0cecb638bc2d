// Entity Models - the three CRM import files
//
// Each entity is a flat value record:
// - Doctor  -> Company (import_companies.csv)
// - Patient -> Contact (import_contacts.csv)
// - Deal    -> Deal    (import_deals.csv), references both by key

pub mod doctor;
pub mod patient;
pub mod deal;

pub use doctor::{Doctor, Specialty, derive_domain, generate_doctors};
pub use patient::{Patient, build_email, is_valid_email, generate_patients};
pub use deal::{Deal, DealStage, StageSampler, STAGE_WEIGHTS, draw_amount};
