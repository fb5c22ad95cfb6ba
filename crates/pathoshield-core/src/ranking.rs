//! Clinical-priority ordering of susceptible antibiotics.
//!
//! Ordering is a pure function of the names and a static metadata table.
//! Sort key, most significant first:
//!
//! 1. first-line before not first-line
//! 2. safety: high, then medium, then low
//! 3. common before uncommon
//! 4. case-sensitive lexical order of the name
//!
//! Names absent from the table rank as not first-line, low safety, uncommon.

use std::cmp::Ordering;

use pathoshield_contracts::prediction::PredictionResult;
use tracing::warn;

/// Safety tier of an antibiotic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    High,
    Medium,
    Low,
}

impl Safety {
    pub fn rank(self) -> u8 {
        match self {
            Safety::High => 3,
            Safety::Medium => 2,
            Safety::Low => 1,
        }
    }
}

/// Static clinical metadata for one antibiotic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AntibioticProfile {
    pub first_line: bool,
    pub safety: Safety,
    pub common: bool,
}

impl AntibioticProfile {
    const UNKNOWN: AntibioticProfile = AntibioticProfile {
        first_line: false,
        safety: Safety::Low,
        common: false,
    };

    const fn new(first_line: bool, safety: Safety, common: bool) -> Self {
        Self {
            first_line,
            safety,
            common,
        }
    }
}

const FIRST_LINE: AntibioticProfile = AntibioticProfile::new(true, Safety::High, true);
const RESERVE_COMMON: AntibioticProfile = AntibioticProfile::new(false, Safety::Medium, true);
const RESERVE_UNCOMMON: AntibioticProfile = AntibioticProfile::new(false, Safety::Medium, false);

static PROFILES: &[(&str, AntibioticProfile)] = &[
    ("Amoxicillin", FIRST_LINE),
    ("Amoxicillin-Clavulanate", FIRST_LINE),
    ("Ceftriaxone", FIRST_LINE),
    ("Cefazolin", FIRST_LINE),
    ("Azithromycin", FIRST_LINE),
    ("Clarithromycin", FIRST_LINE),
    ("Trimethoprim-Sulfamethoxazole", FIRST_LINE),
    ("Doxycycline", FIRST_LINE),
    ("Tetracycline", FIRST_LINE),
    ("Ciprofloxacin", RESERVE_COMMON),
    ("Levofloxacin", RESERVE_COMMON),
    ("Gentamicin", RESERVE_COMMON),
    ("Vancomycin", RESERVE_UNCOMMON),
    ("Meropenem", RESERVE_UNCOMMON),
    ("Imipenem", RESERVE_UNCOMMON),
    ("Tobramycin", RESERVE_UNCOMMON),
];

/// Look up `name`. Matching is exact and case-sensitive.
pub fn profile(name: &str) -> AntibioticProfile {
    PROFILES
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, p)| *p)
        .unwrap_or(AntibioticProfile::UNKNOWN)
}

/// Total order used for display. `Less` means `a` is shown first.
pub fn compare(a: &str, b: &str) -> Ordering {
    let pa = profile(a);
    let pb = profile(b);

    pb.first_line
        .cmp(&pa.first_line)
        .then_with(|| pb.safety.rank().cmp(&pa.safety.rank()))
        .then_with(|| pb.common.cmp(&pa.common))
        .then_with(|| a.cmp(b))
}

/// Return `names` in display order. The input is left untouched.
pub fn rank_susceptible(names: &[String]) -> Vec<String> {
    let mut ranked = names.to_vec();
    ranked.sort_by(|a, b| compare(a, b));
    ranked
}

// ── Badges ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    FirstLine,
    HighSafety,
    Common,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::FirstLine => "First-Line",
            Badge::HighSafety => "High Safety",
            Badge::Common => "Common",
        }
    }
}

/// Badges shown next to `name`, in display order.
pub fn badges(name: &str) -> Vec<Badge> {
    let p = profile(name);
    let mut out = Vec::with_capacity(3);
    if p.first_line {
        out.push(Badge::FirstLine);
    }
    if p.safety == Safety::High {
        out.push(Badge::HighSafety);
    }
    if p.common {
        out.push(Badge::Common);
    }
    out
}

// ── Recommendations ──────────────────────────────────────────────────────────

/// One selectable entry of the suggestion list.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedAntibiotic {
    pub name: String,
    pub badges: Vec<Badge>,
}

/// The suggestion list derived from a prediction.
///
/// `ranked` holds the susceptible antibiotics in display order; `resistant`
/// keeps the backend order and is never selectable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Recommendations {
    pub ranked: Vec<RankedAntibiotic>,
    pub resistant: Vec<String>,
}

impl Recommendations {
    pub fn from_prediction(prediction: &PredictionResult) -> Self {
        let overlap = prediction.overlapping_antibiotics();
        if !overlap.is_empty() {
            warn!(
                patient_id = %prediction.patient_id,
                overlap = ?overlap,
                "antibiotic listed as both susceptible and resistant"
            );
        }

        let ranked = rank_susceptible(&prediction.susceptible_antibiotics)
            .into_iter()
            .map(|name| RankedAntibiotic {
                badges: badges(&name),
                name,
            })
            .collect();

        Self {
            ranked,
            resistant: prediction.resistant_antibiotics.clone(),
        }
    }

    pub fn is_selectable(&self, name: &str) -> bool {
        self.ranked.iter().any(|r| r.name == name)
    }

    /// Name of the entry at `index` in display order.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.ranked.get(index).map(|r| r.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_line_precedes_reserve_agents() {
        let ranked = rank_susceptible(&names(&["Meropenem", "Ciprofloxacin", "Amoxicillin"]));
        assert_eq!(ranked, names(&["Amoxicillin", "Ciprofloxacin", "Meropenem"]));
    }

    #[test]
    fn common_breaks_ties_within_safety_tier() {
        let ranked = rank_susceptible(&names(&["Vancomycin", "Gentamicin"]));
        assert_eq!(ranked[0], "Gentamicin");
    }

    #[test]
    fn unknown_names_sort_last_and_lexically() {
        let ranked = rank_susceptible(&names(&["Zzz-mycin", "Colistin", "Imipenem", "Azithromycin"]));
        assert_eq!(ranked, names(&["Azithromycin", "Imipenem", "Colistin", "Zzz-mycin"]));
    }

    #[test]
    fn lexical_tie_break_is_case_sensitive() {
        // Uppercase sorts before lowercase in byte order.
        let ranked = rank_susceptible(&names(&["alpha", "Beta"]));
        assert_eq!(ranked, names(&["Beta", "alpha"]));
    }

    #[test]
    fn ranking_is_deterministic_and_does_not_mutate_input() {
        let input = names(&["Tobramycin", "Doxycycline", "Levofloxacin", "Cefazolin", "Ceftriaxone"]);
        let first = rank_susceptible(&input);
        for _ in 0..10 {
            assert_eq!(rank_susceptible(&input), first);
        }
        assert_eq!(rank_susceptible(&first), first, "ranking a ranked list must be a no-op");
        assert_eq!(input[0], "Tobramycin");
    }

    #[test]
    fn duplicates_are_kept() {
        let ranked = rank_susceptible(&names(&["Amoxicillin", "Meropenem", "Amoxicillin"]));
        assert_eq!(ranked, names(&["Amoxicillin", "Amoxicillin", "Meropenem"]));
    }

    #[test]
    fn unknown_profile_defaults() {
        let p = profile("amoxicillin");
        assert!(!p.first_line, "lookup must be case-sensitive");
        assert_eq!(p.safety, Safety::Low);
        assert!(!p.common);
    }

    #[test]
    fn badges_follow_profile() {
        assert_eq!(
            badges("Amoxicillin"),
            vec![Badge::FirstLine, Badge::HighSafety, Badge::Common]
        );
        assert_eq!(badges("Ciprofloxacin"), vec![Badge::Common]);
        assert!(badges("Meropenem").is_empty());
        assert_eq!(Badge::HighSafety.label(), "High Safety");
    }

    #[test]
    fn recommendations_keep_resistant_in_backend_order() {
        let prediction = PredictionResult {
            bacterial_species: "E. coli".to_string(),
            susceptible_antibiotics: names(&["Meropenem", "Amoxicillin"]),
            resistant_antibiotics: names(&["Tetracycline", "Ampicillin"]),
            region: None,
            confidence: None,
            patient_id: "PAT-1".to_string(),
        };
        let rec = Recommendations::from_prediction(&prediction);

        assert_eq!(rec.name_at(0), Some("Amoxicillin"));
        assert_eq!(rec.resistant, names(&["Tetracycline", "Ampicillin"]));
        assert!(rec.is_selectable("Meropenem"));
        assert!(!rec.is_selectable("Tetracycline"));
        assert_eq!(rec.name_at(5), None);
    }

    #[test]
    fn overlapping_antibiotic_is_reported_but_kept() {
        let prediction = PredictionResult {
            bacterial_species: "K. pneumoniae".to_string(),
            susceptible_antibiotics: names(&["Meropenem", "Amoxicillin"]),
            resistant_antibiotics: names(&["Meropenem"]),
            region: None,
            confidence: None,
            patient_id: "PAT-2".to_string(),
        };
        assert_eq!(prediction.overlapping_antibiotics(), vec!["Meropenem"]);

        let rec = Recommendations::from_prediction(&prediction);
        assert!(rec.is_selectable("Meropenem"));
        assert_eq!(rec.resistant, names(&["Meropenem"]));
    }
}
