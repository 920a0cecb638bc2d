// 🇧🇷 Name Source - pt-BR names and free mail providers
// Feeds the entity generators with locale-plausible values

use rand::Rng;

// ============================================================================
// NAME SOURCE TRAIT
// ============================================================================

/// NameSource - where generators get their names from
///
/// Generators only depend on this trait, so tests can plug in a fixed
/// source (e.g. a name ending in "Jr.") without touching the generators.
pub trait NameSource {
    /// Full male name, may carry a prefix ("Sr.") or a compound last name
    fn male_full_name<R: Rng + ?Sized>(&self, rng: &mut R) -> String;

    /// First name (any gender), may contain a space ("Ana Clara")
    fn first_name<R: Rng + ?Sized>(&self, rng: &mut R) -> String;

    /// Last name, may contain a particle ("da Costa")
    fn last_name<R: Rng + ?Sized>(&self, rng: &mut R) -> String;

    /// Free e-mail provider domain ("gmail.com")
    fn free_email_domain<R: Rng + ?Sized>(&self, rng: &mut R) -> String;
}

// ============================================================================
// PT-BR WORD LISTS
// ============================================================================

const MALE_FIRST_NAMES: &[&str] = &[
    "Alexandre", "André", "Antônio", "Arthur", "Benjamin", "Bernardo", "Bruno",
    "Caio", "Carlos Eduardo", "Cauã", "Daniel", "Davi", "Davi Lucas", "Diego",
    "Eduardo", "Emanuel", "Enzo", "Enzo Gabriel", "Felipe", "Fernando",
    "Francisco", "Gabriel", "Guilherme", "Gustavo", "Heitor", "Henrique",
    "Igor", "Isaac", "João", "João Guilherme", "João Lucas", "João Miguel",
    "João Pedro", "Joaquim", "Leonardo", "Lorenzo", "Luan", "Lucas", "Luiz Felipe",
    "Luiz Fernando", "Marcelo", "Marcos Vinicius", "Matheus", "Miguel", "Murilo",
    "Nicolas", "Otávio", "Paulo", "Pedro", "Pedro Henrique", "Rafael", "Raul",
    "Rodrigo", "Samuel", "Thiago", "Vicente", "Vinicius", "Vitor", "Vitor Hugo",
];

const FEMALE_FIRST_NAMES: &[&str] = &[
    "Agatha", "Alana", "Alice", "Amanda", "Ana", "Ana Beatriz", "Ana Carolina",
    "Ana Clara", "Ana Julia", "Ana Laura", "Ana Luiza", "Beatriz", "Bianca",
    "Camila", "Carolina", "Cecília", "Clara", "Eduarda", "Elisa", "Emanuelly",
    "Esther", "Fernanda", "Gabriela", "Giovanna", "Helena", "Isabela", "Isadora",
    "Júlia", "Laura", "Lavínia", "Letícia", "Lorena", "Luana", "Luiza", "Manuela",
    "Marcela", "Maria", "Maria Alice", "Maria Clara", "Maria Eduarda",
    "Maria Fernanda", "Maria Julia", "Mariana", "Melissa", "Nicole", "Olivia",
    "Pietra", "Rafaela", "Rebeca", "Sarah", "Sophia", "Stella", "Valentina",
    "Vitória", "Yasmin",
];

const LAST_NAMES: &[&str] = &[
    "Almeida", "Alves", "Aragão", "Araújo", "Azevedo", "Barbosa", "Barros",
    "Cardoso", "Carvalho", "Castro", "Cavalcanti", "Correia", "Costa", "Cunha",
    "da Conceição", "da Costa", "da Cruz", "da Cunha", "da Luz", "da Mata",
    "da Mota", "da Paz", "da Rocha", "da Rosa", "das Neves", "Dias", "Duarte",
    "Farias", "Fernandes", "Ferreira", "Fogaça", "Freitas", "Gomes", "Lima",
    "Lopes", "Martins", "Melo", "Mendes", "Monteiro", "Moraes", "Moreira",
    "Nascimento", "Nogueira", "Nunes", "Oliveira", "Peixoto", "Pereira",
    "Pinto", "Porto", "Ramos", "Rezende", "Ribeiro", "Rocha", "Rodrigues",
    "Sales", "Santos", "Silva", "Silveira", "Souza", "Teixeira", "Vieira",
];

const MALE_PREFIXES: &[&str] = &["Sr.", "Dr."];

const FREE_EMAIL_DOMAINS: &[&str] = &[
    "gmail.com", "hotmail.com", "yahoo.com.br", "bol.com.br", "ig.com.br",
    "uol.com.br", "outlook.com",
];

fn pick<R: Rng + ?Sized>(rng: &mut R, list: &[&'static str]) -> &'static str {
    list[rng.gen_range(0..list.len())]
}

// ============================================================================
// PT-BR NAME SOURCE
// ============================================================================

/// Brazilian Portuguese name source
#[derive(Debug, Clone, Copy, Default)]
pub struct PtBrNames;

impl NameSource for PtBrNames {
    fn male_full_name<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let first = pick(rng, MALE_FIRST_NAMES);
        let last = pick(rng, LAST_NAMES);

        // Mix of formats: plain, with prefix, with two last names
        match rng.gen_range(0..10) {
            0 => format!("{} {} {}", pick(rng, MALE_PREFIXES), first, last),
            1 | 2 => format!("{} {} {}", first, last, pick(rng, LAST_NAMES)),
            _ => format!("{} {}", first, last),
        }
    }

    fn first_name<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        if rng.gen_bool(0.5) {
            pick(rng, MALE_FIRST_NAMES).to_string()
        } else {
            pick(rng, FEMALE_FIRST_NAMES).to_string()
        }
    }

    fn last_name<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        pick(rng, LAST_NAMES).to_string()
    }

    fn free_email_domain<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        pick(rng, FREE_EMAIL_DOMAINS).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_full_names_have_at_least_two_tokens() {
        let mut rng = StdRng::seed_from_u64(7);
        let names = PtBrNames;

        for _ in 0..500 {
            let name = names.male_full_name(&mut rng);
            assert!(name.split_whitespace().count() >= 2, "short name: {}", name);
        }
    }

    #[test]
    fn test_free_email_domains_look_like_domains() {
        let mut rng = StdRng::seed_from_u64(7);
        let names = PtBrNames;

        for _ in 0..100 {
            let domain = names.free_email_domain(&mut rng);
            assert!(domain.contains('.'));
            assert!(!domain.contains('@'));
        }
    }
}
