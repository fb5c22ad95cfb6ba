//! In-memory prediction store and the surveillance aggregations over it.
//!
//! Surveillance figures are derived from stored predictions the same way the
//! backend derives them from its database: cases are prediction counts and
//! the resistance rate of one prediction is resistant / (susceptible +
//! resistant).

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, Utc};

use pathoshield_contracts::surveillance::{OrganismShare, RegionRecord, Trend, TrendPoint};

use crate::mock_data::{locate_region, title_case};

/// Rate used when a region or month has nothing to average.
const FALLBACK_RATE: f64 = 0.25;
const TREND_MONTHS: i64 = 12;
const DAYS_PER_MONTH: i64 = 30;
const TOP_ORGANISMS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredPrediction {
    pub bacterial_species: String,
    pub region: Option<String>,
    pub susceptible_antibiotics: Vec<String>,
    pub resistant_antibiotics: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl StoredPrediction {
    /// resistant / total, or `None` when no antibiotics were reported.
    fn resistance_rate(&self) -> Option<f64> {
        let resistant = self.resistant_antibiotics.len();
        let total = self.susceptible_antibiotics.len() + resistant;
        (total > 0).then(|| resistant as f64 / total as f64)
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Debug, Default)]
pub struct PredictionStore {
    records: Vec<StoredPrediction>,
}

impl PredictionStore {
    pub fn new(records: Vec<StoredPrediction>) -> Self {
        Self { records }
    }

    pub fn insert(&mut self, record: StoredPrediction) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One record per known region, in order of first appearance.
    ///
    /// Region names are matched case-insensitively; names that cannot be
    /// placed on the map are skipped.
    pub fn regions(&self, now: DateTime<Utc>) -> Vec<RegionRecord> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<&StoredPrediction>> = HashMap::new();
        for record in &self.records {
            let Some(key) = record
                .region
                .as_deref()
                .map(|r| r.trim().to_lowercase())
                .filter(|r| !r.is_empty())
            else {
                continue;
            };
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            groups.entry(key).or_default().push(record);
        }

        order
            .into_iter()
            .filter_map(|key| {
                let known = locate_region(&key)?;
                let predictions = groups.remove(&key)?;
                let display = if known.key == key {
                    known.display.to_string()
                } else {
                    title_case(&key)
                };
                Some(aggregate_region(display, known.lat, known.lng, &predictions, now))
            })
            .collect()
    }

    /// Twelve 30-day buckets ending at `now`, oldest first. Each bucket
    /// includes its start instant and excludes its end.
    pub fn trends(&self, now: DateTime<Utc>) -> Vec<TrendPoint> {
        (0..TREND_MONTHS)
            .rev()
            .map(|i| {
                let start = now - Duration::days(DAYS_PER_MONTH * (i + 1));
                let end = now - Duration::days(DAYS_PER_MONTH * i);
                let bucket: Vec<&StoredPrediction> = self
                    .records
                    .iter()
                    .filter(|r| r.created_at >= start && r.created_at < end)
                    .collect();

                let rate = if bucket.is_empty() {
                    FALLBACK_RATE
                } else {
                    let sum: f64 = bucket.iter().filter_map(|r| r.resistance_rate()).sum();
                    sum / bucket.len() as f64
                };

                TrendPoint {
                    month: Some(end.format("%b %Y").to_string()),
                    month_index: Some((TREND_MONTHS - 1 - i) as u32),
                    date: Some(end.format("%Y-%m").to_string()),
                    resistance_rate: Some(round_to(rate, 3)),
                    cases: Some(bucket.len() as u64),
                }
            })
            .collect()
    }

    /// The ten most frequent species, most frequent first.
    ///
    /// Percentages are relative to the cases of those ten only.
    pub fn organism_distribution(&self) -> Vec<OrganismShare> {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for record in &self.records {
            let species = record.bacterial_species.as_str();
            if species.is_empty() {
                continue;
            }
            let count = counts.entry(species).or_insert(0);
            if *count == 0 {
                order.push(species);
            }
            *count += 1;
        }

        let mut ranked: Vec<(&str, u64)> = order.into_iter().map(|s| (s, counts[s])).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(TOP_ORGANISMS);

        let total: u64 = ranked.iter().map(|(_, c)| c).sum();
        ranked
            .into_iter()
            .map(|(organism, cases)| OrganismShare {
                organism: organism.to_string(),
                cases,
                percentage: Some(if total > 0 {
                    round_to(cases as f64 / total as f64 * 100.0, 1)
                } else {
                    0.0
                }),
            })
            .collect()
    }
}

fn aggregate_region(
    region: String,
    lat: f64,
    lng: f64,
    predictions: &[&StoredPrediction],
    now: DateTime<Utc>,
) -> RegionRecord {
    let rates: Vec<f64> = predictions.iter().filter_map(|p| p.resistance_rate()).collect();
    let avg = if rates.is_empty() {
        FALLBACK_RATE
    } else {
        rates.iter().sum::<f64>() / rates.len() as f64
    };

    let organisms: BTreeSet<String> = predictions
        .iter()
        .filter(|p| !p.bacterial_species.is_empty())
        .map(|p| p.bacterial_species.clone())
        .collect();

    RegionRecord {
        region,
        lat,
        lng,
        cases: predictions.len() as u64,
        avg_resistance_rate: round_to(avg, 3),
        organisms: organisms.into_iter().collect(),
        trend: classify_trend(predictions, now),
    }
}

/// Compare the last 30 days with the 30 before them. A change of more than
/// 10% either way is a trend.
fn classify_trend(predictions: &[&StoredPrediction], now: DateTime<Utc>) -> Trend {
    let ages: Vec<i64> = predictions
        .iter()
        .map(|p| (now - p.created_at).num_days())
        .collect();
    let recent = ages.iter().filter(|&&age| age <= 30).count() as f64;
    let older = ages.iter().filter(|&&age| (31..=60).contains(&age)).count() as f64;

    if older == 0.0 {
        Trend::Stable
    } else if recent > older * 1.1 {
        Trend::Increasing
    } else if recent < older * 0.9 {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}
