// 🧑 Patient Entity - imported into the CRM as a Contact
//
// Email is built from the sanitized name parts. A missing last name is a
// deliberate defect, but the email must stay a valid address anyway.

use crate::names::NameSource;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Local part used only if a first name sanitizes to nothing
const FALLBACK_LOCAL_PART: &str = "paciente";

/// Column order in `import_contacts.csv` follows field order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(rename = "firstname")]
    pub first_name: String,

    /// None = missing-data defect
    #[serde(rename = "lastname")]
    pub last_name: Option<String>,

    pub email: String,
}

impl Patient {
    pub fn new(first_name: String, last_name: Option<String>, mail_domain: &str) -> Self {
        let email = build_email(&first_name, last_name.as_deref(), mail_domain);

        Patient {
            first_name,
            last_name,
            email,
        }
    }

    pub const HEADER: [&'static str; 3] = ["firstname", "lastname", "email"];
}

/// Lower-case, whitespace runs become single periods, no stray periods
///
/// "Ana  Clara" -> "ana.clara", "da Costa" -> "da.costa"
pub fn sanitize_name_part(part: &str) -> String {
    part.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '.')
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// first[.last]@domain; the last-name segment and its period are omitted
/// when there is no last name
pub fn build_email(first_name: &str, last_name: Option<&str>, mail_domain: &str) -> String {
    let mut local = sanitize_name_part(first_name);

    if let Some(last) = last_name {
        let last = sanitize_name_part(last);
        if !last.is_empty() {
            if !local.is_empty() {
                local.push('.');
            }
            local.push_str(&last);
        }
    }

    if local.is_empty() {
        local = FALLBACK_LOCAL_PART.to_string();
    }

    format!("{}@{}", local, mail_domain)
}

/// Syntactic check: one '@', non-empty local part and domain, no empty
/// period-separated segments in the local part
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };

    !local.is_empty()
        && !domain.is_empty()
        && local.split('.').all(|segment| !segment.is_empty())
        && domain.split('.').all(|segment| !segment.is_empty())
}

/// Generate exactly `count` patients; the first `missing_last_names` of them
/// (capped at `count`) have no last name
///
/// Emails are unique within the batch: a colliding address gets a numeric
/// suffix on the local part ("ana2@gmail.com").
pub fn generate_patients<R, N>(
    rng: &mut R,
    names: &N,
    count: usize,
    missing_last_names: usize,
) -> Vec<Patient>
where
    R: Rng + ?Sized,
    N: NameSource,
{
    let mut seen = HashSet::with_capacity(count);

    (0..count)
        .map(|i| {
            let first_name = names.first_name(rng);
            let last_name = names.last_name(rng);
            let last_name = if i < missing_last_names {
                None
            } else {
                Some(last_name)
            };
            let mail_domain = names.free_email_domain(rng);

            let mut patient = Patient::new(first_name, last_name, &mail_domain);
            let mut n = 2;
            while seen.contains(&patient.email) {
                patient.email = with_local_suffix(&patient.email, n);
                n += 1;
            }
            seen.insert(patient.email.clone());
            patient
        })
        .collect()
}

fn with_local_suffix(email: &str, n: usize) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let base = local.trim_end_matches(|c: char| c.is_ascii_digit());
            format!("{}{}@{}", base, n, domain)
        }
        None => format!("{}{}", email, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::PtBrNames;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_build_email_with_last_name() {
        assert_eq!(
            build_email("Ana Clara", Some("da Costa"), "gmail.com"),
            "ana.clara.da.costa@gmail.com"
        );
    }

    #[test]
    fn test_build_email_without_last_name() {
        let email = build_email("Marcos Vinicius", None, "bol.com.br");

        assert_eq!(email, "marcos.vinicius@bol.com.br");
        assert!(is_valid_email(&email));
    }

    #[test]
    fn test_build_email_never_produces_empty_segments() {
        let email = build_email(" Pedro ", Some("  "), "uol.com.br");
        assert_eq!(email, "pedro@uol.com.br");

        let email = build_email("", None, "uol.com.br");
        assert!(is_valid_email(&email));
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("joao.silva@gmail.com"));
        assert!(!is_valid_email("joao.@gmail.com"));
        assert!(!is_valid_email("@gmail.com"));
        assert!(!is_valid_email("joao@"));
        assert!(!is_valid_email("jo@ao@gmail.com"));
        assert!(!is_valid_email("joao..silva@gmail.com"));
    }

    #[test]
    fn test_generate_missing_last_names_exact() {
        let mut rng = StdRng::seed_from_u64(11);
        let patients = generate_patients(&mut rng, &PtBrNames, 50, 5);

        assert_eq!(patients.len(), 50);
        assert_eq!(patients.iter().filter(|p| p.last_name.is_none()).count(), 5);
        assert!(patients[..5].iter().all(|p| p.last_name.is_none()));
        assert!(patients.iter().all(|p| is_valid_email(&p.email)));
    }

    #[test]
    fn test_emails_unique_within_batch() {
        let mut rng = StdRng::seed_from_u64(21);
        let patients = generate_patients(&mut rng, &PtBrNames, 400, 200);

        let emails: HashSet<&str> = patients.iter().map(|p| p.email.as_str()).collect();
        assert_eq!(emails.len(), 400);
        assert!(patients.iter().all(|p| is_valid_email(&p.email)));
    }

    #[test]
    fn test_missing_last_names_capped_at_count() {
        let mut rng = StdRng::seed_from_u64(11);
        let patients = generate_patients(&mut rng, &PtBrNames, 3, 10);

        assert_eq!(patients.len(), 3);
        assert!(patients.iter().all(|p| p.last_name.is_none()));
        assert!(patients.iter().all(|p| is_valid_email(&p.email)));
    }
}
