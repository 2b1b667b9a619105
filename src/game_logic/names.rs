use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

const GIVEN_NAMES: &[&str] = &[
    "Ada", "Bram", "Cora", "Dunstan", "Edda", "Fenn", "Greta", "Hollis", "Ilse", "Jory",
    "Kit", "Linnea", "Mabel", "Nils", "Orla", "Piet", "Quill", "Rosalind", "Sten", "Tamsin",
];

const SURNAMES: &[&str] = &[
    "Miller", "Cooper", "Thatcher", "Fletcher", "Chandler", "Baker", "Wright", "Tanner",
    "Weaver", "Potter", "Brewer", "Carter", "Mason", "Fisher", "Sawyer", "Dyer",
];

const TRADES: &[&str] = &[
    "the Baker", "the Smith", "the Ferryman", "the Clerk", "the Herbalist", "the Lamplighter",
    "the Cobbler", "the Scribe",
];

/// Hands out townsfolk names, never the same one twice
#[derive(Debug, Default)]
pub struct NameGenerator {
    used: HashSet<String>,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        for _ in 0..32 {
            let candidate = compose_name(rng);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }

        // Name space exhausted around this pick; disambiguate with a numeral
        let base = compose_name(rng);
        let mut suffix = 2;
        loop {
            let candidate = format!("{base} {}", roman(suffix));
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

fn compose_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let given = GIVEN_NAMES.choose(rng).copied().unwrap_or("Ada");
    match rng.gen_range(0..4) {
        0 => {
            // Given name + trade
            let trade = TRADES.choose(rng).copied().unwrap_or("the Baker");
            format!("{given} {trade}")
        }
        _ => {
            let surname = SURNAMES.choose(rng).copied().unwrap_or("Miller");
            format!("{given} {surname}")
        }
    }
}

fn roman(mut value: u32) -> String {
    const NUMERALS: &[(u32, &str)] = &[
        (1000, "M"), (900, "CM"), (500, "D"), (400, "CD"), (100, "C"), (90, "XC"),
        (50, "L"), (40, "XL"), (10, "X"), (9, "IX"), (5, "V"), (4, "IV"), (1, "I"),
    ];
    let mut out = String::new();
    for &(n, s) in NUMERALS {
        while value >= n {
            out.push_str(s);
            value -= n;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn test_names_are_unique() {
        let mut rng = Pcg64::seed_from_u64(3);
        let mut names = NameGenerator::new();
        let generated: Vec<String> = (0..600).map(|_| names.generate(&mut rng)).collect();

        let unique: HashSet<&String> = generated.iter().collect();
        assert_eq!(unique.len(), generated.len());
    }

    #[test]
    fn test_names_are_reproducible() {
        let mut a = NameGenerator::new();
        let mut b = NameGenerator::new();
        let mut rng_a = Pcg64::seed_from_u64(11);
        let mut rng_b = Pcg64::seed_from_u64(11);

        for _ in 0..20 {
            assert_eq!(a.generate(&mut rng_a), b.generate(&mut rng_b));
        }
    }

    #[test]
    fn test_roman_suffix() {
        assert_eq!(roman(2), "II");
        assert_eq!(roman(14), "XIV");
    }
}
