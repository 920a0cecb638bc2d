// 🔗 Referential Linker - builds Deals that point at Patients and Doctors
//
// Two strategies:
// - Independent: patient + doctor drawn with replacement for every deal,
//   the first K deals lose their doctor (missing foreign key defect)
// - Recurrence: every patient appears at least once, extra deals are
//   returning patients, shuffled; every deal has a doctor

use crate::entities::{draw_amount, Deal, Doctor, Patient, StageSampler};
use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// STRATEGY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkStrategy {
    /// Patient and doctor sampled independently; first `doctorless_deals`
    /// deals get no company reference
    Independent { doctorless_deals: usize },

    /// Each patient once plus resampled returning patients; company
    /// reference always present
    Recurrence,
}

impl LinkStrategy {
    /// Header of the company reference column expected by the CRM importer
    pub fn company_column(&self) -> &'static str {
        match self {
            LinkStrategy::Independent { .. } => "company_domain",
            LinkStrategy::Recurrence => "associated_company_domain",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LinkStrategy::Independent { .. } => "independent",
            LinkStrategy::Recurrence => "recurrence",
        }
    }
}

// ============================================================================
// LOOKUP INDEXES
// ============================================================================

/// Patients by email, built once per run
#[derive(Debug)]
pub struct PatientIndex<'a> {
    by_email: HashMap<&'a str, &'a Patient>,
}

impl<'a> PatientIndex<'a> {
    /// First occurrence wins when emails repeat
    pub fn build(patients: &'a [Patient]) -> Self {
        let mut by_email = HashMap::with_capacity(patients.len());
        for patient in patients {
            by_email.entry(patient.email.as_str()).or_insert(patient);
        }
        PatientIndex { by_email }
    }

    pub fn get(&self, email: &str) -> Option<&'a Patient> {
        self.by_email.get(email).copied()
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}

/// Doctors by domain, built once per run
#[derive(Debug)]
pub struct DoctorIndex<'a> {
    by_domain: HashMap<&'a str, &'a Doctor>,
}

impl<'a> DoctorIndex<'a> {
    pub fn build(doctors: &'a [Doctor]) -> Self {
        let mut by_domain = HashMap::with_capacity(doctors.len());
        for doctor in doctors {
            by_domain.entry(doctor.domain.as_str()).or_insert(doctor);
        }
        DoctorIndex { by_domain }
    }

    pub fn get(&self, domain: &str) -> Option<&'a Doctor> {
        self.by_domain.get(domain).copied()
    }

    pub fn len(&self) -> usize {
        self.by_domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_domain.is_empty()
    }
}

// ============================================================================
// LINKER
// ============================================================================

pub struct ReferentialLinker {
    strategy: LinkStrategy,
    stages: StageSampler,
}

impl ReferentialLinker {
    pub fn new(strategy: LinkStrategy, stages: StageSampler) -> Self {
        ReferentialLinker { strategy, stages }
    }

    /// Linker with the default funnel weights
    pub fn with_funnel(strategy: LinkStrategy) -> Result<Self> {
        Ok(Self::new(strategy, StageSampler::funnel()?))
    }

    pub fn strategy(&self) -> LinkStrategy {
        self.strategy
    }

    /// Build `total_deals` deals; empty if either side is empty
    pub fn link<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        doctors: &[Doctor],
        patients: &[Patient],
        total_deals: usize,
    ) -> Vec<Deal> {
        if doctors.is_empty() || patients.is_empty() {
            return Vec::new();
        }

        match self.strategy {
            LinkStrategy::Independent { doctorless_deals } => {
                self.link_independent(rng, doctors, patients, total_deals, doctorless_deals)
            }
            LinkStrategy::Recurrence => self.link_recurrence(rng, doctors, patients, total_deals),
        }
    }

    fn link_independent<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        doctors: &[Doctor],
        patients: &[Patient],
        total_deals: usize,
        doctorless_deals: usize,
    ) -> Vec<Deal> {
        (0..total_deals)
            .map(|i| {
                let patient = &patients[rng.gen_range(0..patients.len())];
                let doctor = &doctors[rng.gen_range(0..doctors.len())];

                let company = if i < doctorless_deals {
                    None
                } else {
                    Some(doctor.domain.clone())
                };

                self.make_deal(rng, patient, company)
            })
            .collect()
    }

    fn link_recurrence<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        doctors: &[Doctor],
        patients: &[Patient],
        total_deals: usize,
    ) -> Vec<Deal> {
        // Every patient once, then returning patients
        let mut subjects: Vec<&Patient> = patients.iter().collect();
        let returning = total_deals.saturating_sub(patients.len());
        for _ in 0..returning {
            subjects.push(&patients[rng.gen_range(0..patients.len())]);
        }

        subjects.shuffle(rng);
        subjects.truncate(total_deals);

        subjects
            .into_iter()
            .map(|patient| {
                let doctor = &doctors[rng.gen_range(0..doctors.len())];
                self.make_deal(rng, patient, Some(doctor.domain.clone()))
            })
            .collect()
    }

    fn make_deal<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        patient: &Patient,
        company: Option<String>,
    ) -> Deal {
        let stage = self.stages.draw(rng);
        let amount = draw_amount(rng);

        Deal::new(
            &patient.first_name,
            amount,
            stage,
            patient.email.clone(),
            company,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{generate_doctors, generate_patients};
    use crate::names::PtBrNames;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn fixtures(rng: &mut StdRng, doctors: usize, patients: usize) -> (Vec<Doctor>, Vec<Patient>) {
        (
            generate_doctors(rng, &PtBrNames, doctors, true),
            generate_patients(rng, &PtBrNames, patients, 0),
        )
    }

    #[test]
    fn test_recurrence_scenario_10_80_100() {
        let mut rng = StdRng::seed_from_u64(10);
        let (doctors, patients) = fixtures(&mut rng, 10, 80);
        let linker = ReferentialLinker::with_funnel(LinkStrategy::Recurrence).unwrap();

        let deals = linker.link(&mut rng, &doctors, &patients, 100);

        let unique: HashSet<&str> = deals.iter().map(|d| d.contact_reference.as_str()).collect();
        let expected: HashSet<&str> = patients.iter().map(|p| p.email.as_str()).collect();

        assert_eq!(deals.len(), 100);
        assert_eq!(unique.len(), 80);
        assert_eq!(unique, expected);
        assert!(deals.iter().all(|d| d.company_reference.is_some()));
    }

    #[test]
    fn test_recurrence_fewer_deals_than_patients() {
        let mut rng = StdRng::seed_from_u64(10);
        let (doctors, patients) = fixtures(&mut rng, 3, 30);
        let linker = ReferentialLinker::with_funnel(LinkStrategy::Recurrence).unwrap();

        let deals = linker.link(&mut rng, &doctors, &patients, 12);

        let unique: HashSet<&str> = deals.iter().map(|d| d.contact_reference.as_str()).collect();
        assert_eq!(deals.len(), 12);
        assert_eq!(unique.len(), 12);
    }

    #[test]
    fn test_independent_doctorless_deals_exact() {
        let mut rng = StdRng::seed_from_u64(99);
        let (doctors, patients) = fixtures(&mut rng, 20, 50);
        let linker = ReferentialLinker::with_funnel(LinkStrategy::Independent {
            doctorless_deals: 10,
        })
        .unwrap();

        let deals = linker.link(&mut rng, &doctors, &patients, 100);

        assert_eq!(deals.len(), 100);
        assert_eq!(deals.iter().filter(|d| d.company_reference.is_none()).count(), 10);
        assert!(deals[..10].iter().all(|d| d.company_reference.is_none()));
    }

    #[test]
    fn test_independent_doctorless_capped_at_total() {
        let mut rng = StdRng::seed_from_u64(1);
        let (doctors, patients) = fixtures(&mut rng, 2, 2);
        let linker = ReferentialLinker::with_funnel(LinkStrategy::Independent {
            doctorless_deals: 50,
        })
        .unwrap();

        let deals = linker.link(&mut rng, &doctors, &patients, 4);
        assert_eq!(deals.len(), 4);
        assert!(deals.iter().all(|d| d.company_reference.is_none()));
    }

    #[test]
    fn test_empty_doctors_returns_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        let (_, patients) = fixtures(&mut rng, 0, 5);

        for strategy in [LinkStrategy::Recurrence, LinkStrategy::Independent { doctorless_deals: 2 }] {
            let linker = ReferentialLinker::with_funnel(strategy).unwrap();
            assert!(linker.link(&mut rng, &[], &patients, 10).is_empty());
        }
    }

    #[test]
    fn test_empty_patients_returns_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        let (doctors, _) = fixtures(&mut rng, 4, 0);
        let linker = ReferentialLinker::with_funnel(LinkStrategy::Recurrence).unwrap();

        assert!(linker.link(&mut rng, &doctors, &[], 10).is_empty());
    }

    #[test]
    fn test_foreign_keys_resolve_through_indexes() {
        let mut rng = StdRng::seed_from_u64(8);
        let (doctors, patients) = fixtures(&mut rng, 5, 15);
        let linker = ReferentialLinker::with_funnel(LinkStrategy::Recurrence).unwrap();
        let deals = linker.link(&mut rng, &doctors, &patients, 40);

        let patient_index = PatientIndex::build(&patients);
        let doctor_index = DoctorIndex::build(&doctors);

        for deal in &deals {
            let patient = patient_index.get(&deal.contact_reference).unwrap();
            assert_eq!(deal.name, format!("Atendimento - {}", patient.first_name));

            let domain = deal.company_reference.as_deref().unwrap();
            assert!(doctor_index.get(domain).is_some());
        }
    }

    #[test]
    fn test_company_column_per_strategy() {
        assert_eq!(
            LinkStrategy::Independent { doctorless_deals: 0 }.company_column(),
            "company_domain"
        );
        assert_eq!(LinkStrategy::Recurrence.company_column(), "associated_company_domain");
    }
}
