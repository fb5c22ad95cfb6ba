//! Shaping of surveillance data into chart series and map markers.
//!
//! Nothing here knows how it will be drawn. Colours are palette indices;
//! the front end maps them onto its theme.

use pathoshield_contracts::surveillance::{OrganismShare, RegionRecord, Trend, TrendPoint};

/// Map centre (Pakistan), as (lat, lng).
pub const MAP_CENTER: (f64, f64) = (30.3753, 69.3451);

/// Organisms plotted in the distribution chart, in no particular order.
pub const TRACKED_ORGANISMS: [&str; 4] = ["E. coli", "K. pneumoniae", "S. aureus", "P. aeruginosa"];

const MARKER_ORGANISMS: usize = 3;

// ── Trend tone ───────────────────────────────────────────────────────────────

/// How a trend should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendTone {
    /// Resistance rising. Drawn in red.
    Alert,
    /// Resistance falling. Drawn in green.
    Improving,
    Neutral,
}

impl From<Trend> for TrendTone {
    fn from(trend: Trend) -> Self {
        match trend {
            Trend::Increasing => TrendTone::Alert,
            Trend::Decreasing => TrendTone::Improving,
            Trend::Stable => TrendTone::Neutral,
        }
    }
}

pub fn trend_icon(trend: Trend) -> &'static str {
    match trend {
        Trend::Increasing => "↑",
        Trend::Decreasing => "↓",
        Trend::Stable => "→",
    }
}

/// Advisory sentence for the region detail panel.
pub fn trend_advice(trend: Trend) -> &'static str {
    match trend {
        Trend::Increasing => {
            "Resistance rates are showing an upward trend. Immediate attention recommended."
        }
        Trend::Decreasing => {
            "Resistance rates are declining. Current interventions appear effective."
        }
        Trend::Stable => {
            "Resistance rates have remained stable. Continued monitoring recommended."
        }
    }
}

// ── Trend series ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TrendChartPoint {
    pub label: String,
    /// Resistance in percent, rounded to one decimal.
    pub resistance_percent: f64,
    pub cases: u64,
}

impl From<&TrendPoint> for TrendChartPoint {
    fn from(point: &TrendPoint) -> Self {
        let label = point
            .month
            .clone()
            .or_else(|| point.date.clone())
            .unwrap_or_else(|| "N/A".to_string());
        let percent = point.resistance_rate.unwrap_or(0.0) * 100.0;

        Self {
            label,
            resistance_percent: (percent * 10.0).round() / 10.0,
            cases: point.cases.unwrap_or(0),
        }
    }
}

pub fn trend_series(points: &[TrendPoint]) -> Vec<TrendChartPoint> {
    points.iter().map(TrendChartPoint::from).collect()
}

// ── Organism bars ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct OrganismBar {
    pub organism: String,
    pub cases: u64,
    pub percentage: f64,
    /// Index into the chart palette. Callers take it modulo the palette length.
    pub palette_index: usize,
}

/// Bars for the tracked organisms only, in backend order.
pub fn organism_bars(distribution: &[OrganismShare]) -> Vec<OrganismBar> {
    distribution
        .iter()
        .filter(|share| TRACKED_ORGANISMS.contains(&share.organism.as_str()))
        .enumerate()
        .map(|(index, share)| OrganismBar {
            organism: share.organism.clone(),
            cases: share.cases,
            percentage: share.percentage.unwrap_or(0.0),
            palette_index: index,
        })
        .collect()
}

// ── Map markers ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub region: String,
    pub lat: f64,
    pub lng: f64,
    pub cases: u64,
    pub resistance_percent: f64,
    pub trend: Trend,
    /// At most three organism names.
    pub organisms: Vec<String>,
    /// Organisms not listed in `organisms`.
    pub overflow: usize,
}

impl MapMarker {
    /// The organism line of the marker popup, e.g. "E. coli, S. aureus +2".
    pub fn organisms_label(&self) -> String {
        let listed = self.organisms.join(", ");
        if self.overflow > 0 {
            format!("{listed} +{}", self.overflow)
        } else {
            listed
        }
    }
}

/// One marker per region that has coordinates and at least one case.
pub fn map_markers(regions: &[RegionRecord]) -> Vec<MapMarker> {
    regions
        .iter()
        .filter(|r| r.lat != 0.0 && r.lng != 0.0 && r.cases > 0)
        .map(|r| MapMarker {
            region: r.region.clone(),
            lat: r.lat,
            lng: r.lng,
            cases: r.cases,
            resistance_percent: r.avg_resistance_rate * 100.0,
            trend: r.trend,
            organisms: r.organisms.iter().take(MARKER_ORGANISMS).cloned().collect(),
            overflow: r.organisms.len().saturating_sub(MARKER_ORGANISMS),
        })
        .collect()
}
