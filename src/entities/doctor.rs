// 🩺 Doctor Entity - imported into the CRM as a Company
//
// "Domain is DERIVED from the name, never drawn on its own"
//
// Problem solved:
// - Deals reference doctors by domain, so the join must be rebuildable
//   from the doctor's name alone
// - Specialty column carries two spellings of neurology on purpose
//   ("Neurologia" vs "Neuro") for downstream normalization tests

use crate::names::NameSource;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Honorific prepended to every generated doctor name
pub const DOCTOR_TITLE: &str = "Dr(a).";

/// Suffix appended to the derived company domain
pub const DOMAIN_SUFFIX: &str = ".med.br";

/// Probability that a doctor is forced to Cardiologia when skew is on
pub const SPECIALTY_SKEW_RATE: f64 = 0.1;

/// Name redraws before a colliding name gets a numeric suffix
const MAX_NAME_DRAWS: usize = 16;

// ============================================================================
// SPECIALTY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialty {
    #[serde(rename = "Neurologia")]
    Neurologia,

    #[serde(rename = "Cardiologia")]
    Cardiologia,

    #[serde(rename = "Clínico Geral")]
    ClinicoGeral,

    #[serde(rename = "Psiquiatria")]
    Psiquiatria,

    #[serde(rename = "Ortopedia")]
    Ortopedia,

    /// Short spelling of Neurologia, kept as a categorical inconsistency
    #[serde(rename = "Neuro")]
    Neuro,
}

impl Specialty {
    /// The 6 values the generator draws from (uniformly)
    pub const ALL: [Specialty; 6] = [
        Specialty::Neurologia,
        Specialty::Cardiologia,
        Specialty::ClinicoGeral,
        Specialty::Psiquiatria,
        Specialty::Ortopedia,
        Specialty::Neuro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::Neurologia => "Neurologia",
            Specialty::Cardiologia => "Cardiologia",
            Specialty::ClinicoGeral => "Clínico Geral",
            Specialty::Psiquiatria => "Psiquiatria",
            Specialty::Ortopedia => "Ortopedia",
            Specialty::Neuro => "Neuro",
        }
    }

    /// Canonical spelling of the same semantic category
    pub fn canonical(&self) -> Specialty {
        match self {
            Specialty::Neuro => Specialty::Neurologia,
            other => *other,
        }
    }

    /// False for alternate spellings (e.g. "Neuro")
    pub fn is_canonical(&self) -> bool {
        self.canonical() == *self
    }
}

// ============================================================================
// DOCTOR ENTITY
// ============================================================================

/// Column order in `import_companies.csv` follows field order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub name: String,
    pub domain: String,
    #[serde(rename = "especialidade_medica")]
    pub specialty: Specialty,
}

impl Doctor {
    /// Build a doctor from a raw full name; title and domain are derived
    pub fn new(raw_name: &str, specialty: Specialty) -> Self {
        let name = format!("{} {}", DOCTOR_TITLE, raw_name.trim());
        let domain = derive_domain(&name);

        Doctor {
            name,
            domain,
            specialty,
        }
    }

    pub const HEADER: [&'static str; 3] = ["name", "domain", "especialidade_medica"];
}

/// Last token of the name, lower-cased, non-alphanumerics removed, plus suffix
///
/// "Dr(a). João Pedro da Silva Jr." -> "jr.med.br"
pub fn derive_domain(name: &str) -> String {
    let last = name.split_whitespace().last().unwrap_or_default();
    let slug: String = last
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();

    format!("{}{}", slug, DOMAIN_SUFFIX)
}

/// Generate exactly `count` doctors with distinct names
///
/// With `specialty_skew` on, each doctor has a 10% chance of being forced
/// to Cardiologia regardless of the uniform draw. Only the injected
/// duplicates may repeat a row, so a name already used is redrawn and,
/// if the pool keeps colliding, suffixed ("Caio Rocha2").
pub fn generate_doctors<R, N>(
    rng: &mut R,
    names: &N,
    count: usize,
    specialty_skew: bool,
) -> Vec<Doctor>
where
    R: Rng + ?Sized,
    N: NameSource,
{
    let mut seen: HashSet<String> = HashSet::with_capacity(count);

    (0..count)
        .map(|_| {
            let raw_name = unused_name(rng, names, &seen);
            let drawn = Specialty::ALL[rng.gen_range(0..Specialty::ALL.len())];
            let specialty = if specialty_skew && rng.gen_bool(SPECIALTY_SKEW_RATE) {
                Specialty::Cardiologia
            } else {
                drawn
            };

            let doctor = Doctor::new(&raw_name, specialty);
            seen.insert(doctor.name.clone());
            doctor
        })
        .collect()
}

fn unused_name<R, N>(rng: &mut R, names: &N, seen: &HashSet<String>) -> String
where
    R: Rng + ?Sized,
    N: NameSource,
{
    let titled = |raw: &str| format!("{} {}", DOCTOR_TITLE, raw.trim());

    let mut raw_name = names.male_full_name(rng);
    for _ in 1..MAX_NAME_DRAWS {
        if !seen.contains(&titled(&raw_name)) {
            return raw_name;
        }
        raw_name = names.male_full_name(rng);
    }

    let base = raw_name.trim().to_string();
    let mut candidate = base.clone();
    let mut n = 2;
    while seen.contains(&titled(&candidate)) {
        candidate = format!("{}{}", base, n);
        n += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::PtBrNames;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_derive_domain_strips_periods() {
        assert_eq!(derive_domain("Dr(a). Sr. Caio Rocha"), "rocha.med.br");
        assert_eq!(derive_domain("Dr(a). Paulo Nunes Jr."), "jr.med.br");
        assert_eq!(derive_domain("Dr(a). Vitor da Luz"), "luz.med.br");
    }

    #[test]
    fn test_doctor_new_adds_title() {
        let doctor = Doctor::new("Thiago Fogaça", Specialty::Ortopedia);

        assert_eq!(doctor.name, "Dr(a). Thiago Fogaça");
        assert_eq!(doctor.domain, "fogaça.med.br");
    }

    #[test]
    fn test_generate_exact_count_and_derivable_domains() {
        let mut rng = StdRng::seed_from_u64(42);
        let doctors = generate_doctors(&mut rng, &PtBrNames, 20, true);

        assert_eq!(doctors.len(), 20);
        for doctor in &doctors {
            assert!(doctor.name.starts_with(DOCTOR_TITLE));
            assert_eq!(derive_domain(&doctor.name), doctor.domain);
        }
    }

    #[test]
    fn test_specialty_skew_favours_cardiologia() {
        let mut rng = StdRng::seed_from_u64(3);
        let skewed = generate_doctors(&mut rng, &PtBrNames, 5_000, true);
        let plain = generate_doctors(&mut rng, &PtBrNames, 5_000, false);

        let cardio = |ds: &[Doctor]| {
            ds.iter().filter(|d| d.specialty == Specialty::Cardiologia).count() as f64
                / ds.len() as f64
        };

        // 1/6 without skew, 0.9/6 + 0.1 = 0.25 with skew
        assert!((cardio(&plain) - 1.0 / 6.0).abs() < 0.03);
        assert!((cardio(&skewed) - 0.25).abs() < 0.03);
    }

    #[test]
    fn test_neuro_is_not_canonical() {
        assert!(!Specialty::Neuro.is_canonical());
        assert_eq!(Specialty::Neuro.canonical(), Specialty::Neurologia);
        assert!(Specialty::ClinicoGeral.is_canonical());
        assert_eq!(Specialty::ClinicoGeral.as_str(), "Clínico Geral");
    }

    #[test]
    fn test_generated_names_are_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        let doctors = generate_doctors(&mut rng, &PtBrNames, 2_000, true);

        let names: HashSet<&str> = doctors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names.len(), 2_000);
        for doctor in &doctors {
            assert_eq!(derive_domain(&doctor.name), doctor.domain);
        }
    }

    /// Every draw returns the same name
    struct OneName;

    impl NameSource for OneName {
        fn male_full_name<R: Rng + ?Sized>(&self, _rng: &mut R) -> String {
            "Caio Rocha".to_string()
        }
        fn first_name<R: Rng + ?Sized>(&self, _rng: &mut R) -> String {
            "Caio".to_string()
        }
        fn last_name<R: Rng + ?Sized>(&self, _rng: &mut R) -> String {
            "Rocha".to_string()
        }
        fn free_email_domain<R: Rng + ?Sized>(&self, _rng: &mut R) -> String {
            "gmail.com".to_string()
        }
    }

    #[test]
    fn test_exhausted_name_pool_gets_suffix() {
        let mut rng = StdRng::seed_from_u64(1);
        let doctors = generate_doctors(&mut rng, &OneName, 3, false);

        let names: Vec<&str> = doctors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Dr(a). Caio Rocha", "Dr(a). Caio Rocha2", "Dr(a). Caio Rocha3"]);
        assert_eq!(doctors[1].domain, "rocha2.med.br");
    }

    #[test]
    fn test_zero_doctors() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_doctors(&mut rng, &PtBrNames, 0, true).is_empty());
    }
}
