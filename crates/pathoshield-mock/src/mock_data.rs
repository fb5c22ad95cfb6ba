//! Simulated clinical data for the PathoShield mock backend.
//!
//! All data in this module is hardcoded and fictional. No external systems
//! are contacted.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::store::StoredPrediction;

// ── Prediction pools ─────────────────────────────────────────────────────────

pub const ORGANISM_POOL: [&str; 5] = [
    "E. coli",
    "K. pneumoniae",
    "S. aureus",
    "P. aeruginosa",
    "A. baumannii",
];

pub const SUSCEPTIBLE_POOL: [&str; 10] = [
    "Amoxicillin",
    "Amoxicillin-Clavulanate",
    "Ceftriaxone",
    "Cefazolin",
    "Trimethoprim-Sulfamethoxazole",
    "Azithromycin",
    "Piperacillin-Tazobactam",
    "Meropenem",
    "Imipenem",
    "Doxycycline",
];

pub const RESISTANT_POOL: [&str; 5] = [
    "Ciprofloxacin",
    "Levofloxacin",
    "Gentamicin",
    "Vancomycin",
    "Tobramycin",
];

pub const SUSCEPTIBLE_PICKS: usize = 6;
pub const RESISTANT_PICKS: usize = 3;

/// Pick `count` distinct names from `pool` in random order.
pub fn sample_names<R: Rng + ?Sized>(rng: &mut R, pool: &[&str], count: usize) -> Vec<String> {
    pool.choose_multiple(rng, count.min(pool.len()))
        .map(|name| name.to_string())
        .collect()
}

/// Model confidence in percent, 75–95, one decimal.
pub fn sample_confidence<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    (rng.gen_range(75.0..=95.0_f64) * 10.0).round() / 10.0
}

pub fn sample_patient_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("PAT-{}", rng.gen_range(10000..=99999))
}

// ── Regions ──────────────────────────────────────────────────────────────────

/// A region the map knows how to place.
#[derive(Debug, Clone, Copy)]
pub struct KnownRegion {
    /// Lower-case lookup key.
    pub key: &'static str,
    pub display: &'static str,
    pub lat: f64,
    pub lng: f64,
}

pub const KNOWN_REGIONS: [KnownRegion; 7] = [
    KnownRegion { key: "punjab", display: "Punjab", lat: 31.5204, lng: 74.3587 },
    KnownRegion { key: "sindh", display: "Sindh", lat: 24.8607, lng: 67.0011 },
    KnownRegion { key: "kpk", display: "KPK", lat: 34.0151, lng: 71.5249 },
    KnownRegion { key: "khyber pakhtunkhwa", display: "KPK", lat: 34.0151, lng: 71.5249 },
    KnownRegion { key: "balochistan", display: "Balochistan", lat: 30.1798, lng: 66.975 },
    KnownRegion { key: "gilgit-baltistan", display: "Gilgit-Baltistan", lat: 35.8028, lng: 74.4667 },
    KnownRegion { key: "azad kashmir", display: "Azad Kashmir", lat: 33.7782, lng: 73.8472 },
];

/// Find the region for a lower-case `key`: exact match first, then the
/// first entry whose key contains, or is contained in, `key`.
pub fn locate_region(key: &str) -> Option<&'static KnownRegion> {
    KNOWN_REGIONS
        .iter()
        .find(|r| r.key == key)
        .or_else(|| KNOWN_REGIONS.iter().find(|r| key.contains(r.key) || r.key.contains(key)))
}

/// Capitalise the first letter of every alphabetic run: "north waziristan"
/// becomes "North Waziristan".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

// ── Seed history ─────────────────────────────────────────────────────────────

const SEED_REGIONS: [&str; 6] = ["Punjab", "Sindh", "KPK", "Balochistan", "Gilgit-Baltistan", "Azad Kashmir"];
const SEED_DAYS: i64 = 330;

/// A plausible prediction history spread over the last eleven months.
///
/// Regions further down `SEED_REGIONS` get fewer records, and the most recent
/// month is denser for the first regions so the map shows every trend.
pub fn seed_history<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>, records: usize) -> Vec<StoredPrediction> {
    let mut history = Vec::with_capacity(records);
    for i in 0..records {
        let region_index = (i * i + i / 3) % SEED_REGIONS.len();
        let region = SEED_REGIONS[region_index];

        let max_age = if region_index < 2 && i % 2 == 0 { 30 } else { SEED_DAYS };
        let age = Duration::days(rng.gen_range(0..max_age)) + Duration::minutes(rng.gen_range(0..1440));

        let resistant_count = rng.gen_range(1..=RESISTANT_PICKS);
        history.push(StoredPrediction {
            bacterial_species: ORGANISM_POOL
                .choose(rng)
                .map(|s| s.to_string())
                .unwrap_or_default(),
            region: Some(region.to_string()),
            susceptible_antibiotics: sample_names(rng, &SUSCEPTIBLE_POOL, SUSCEPTIBLE_PICKS),
            resistant_antibiotics: sample_names(rng, &RESISTANT_POOL, resistant_count),
            created_at: now - age,
        });
    }
    history
}
