//! The surveillance dashboard: three independent datasets and the
//! reductions computed over them.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use pathoshield_contracts::{
    error::AmrResult,
    surveillance::{OrganismShare, RegionRecord, Trend, TrendPoint},
};

use crate::traits::DataSource;

/// Load state of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Fetch<Vec<T>> {
    /// The loaded items, or an empty slice while loading or after failure.
    pub fn items(&self) -> &[T] {
        match self {
            Fetch::Loaded(items) => items.as_slice(),
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Fetch::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Fetch::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    fn from_outcome(dataset: &str, outcome: AmrResult<Vec<T>>) -> Self {
        match outcome {
            Ok(items) => {
                info!(dataset, count = items.len(), "surveillance dataset loaded");
                Fetch::Loaded(items)
            }
            Err(e) => {
                warn!(dataset, error = %e, "surveillance dataset failed");
                Fetch::Failed(e.to_string())
            }
        }
    }
}

/// Aggregates shown above the region table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurveillanceSummary {
    pub total_cases: u64,
    pub distinct_organisms: usize,
    /// Unweighted mean of per-region rates, as a fraction. 0 when empty.
    pub average_resistance_rate: f64,
    pub active_regions: usize,
}

impl SurveillanceSummary {
    pub fn from_regions(regions: &[RegionRecord]) -> Self {
        if regions.is_empty() {
            return Self::default();
        }

        let organisms: HashSet<&str> = regions
            .iter()
            .flat_map(|r| r.organisms.iter().map(String::as_str))
            .collect();
        let rate_sum: f64 = regions.iter().map(|r| r.avg_resistance_rate).sum();

        Self {
            total_cases: regions.iter().map(|r| r.cases).sum(),
            distinct_organisms: organisms.len(),
            average_resistance_rate: rate_sum / regions.len() as f64,
            active_regions: regions.iter().filter(|r| r.cases > 0).count(),
        }
    }

    pub fn average_resistance_label(&self) -> String {
        format!("{:.1}%", self.average_resistance_rate * 100.0)
    }
}

/// One line of the region table.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionRow {
    Region {
        region: String,
        cases: u64,
        resistance: String,
        organisms: String,
        trend: Trend,
    },
    /// Shown alone when there are no regions to list.
    NoData,
}

impl RegionRow {
    pub const NO_DATA_TEXT: &'static str = "No surveillance data available";
}

pub fn region_rows(regions: &[RegionRecord]) -> Vec<RegionRow> {
    if regions.is_empty() {
        return vec![RegionRow::NoData];
    }
    regions
        .iter()
        .map(|r| RegionRow::Region {
            region: r.region.clone(),
            cases: r.cases,
            resistance: format!("{:.1}%", r.avg_resistance_rate * 100.0),
            organisms: r.organisms.join(", "),
            trend: r.trend,
        })
        .collect()
}

/// State of the surveillance screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveillanceDashboard {
    regions: Fetch<Vec<RegionRecord>>,
    trends: Fetch<Vec<TrendPoint>>,
    organisms: Fetch<Vec<OrganismShare>>,
    /// Copy of the region shown in the detail panel.
    selected: Option<RegionRecord>,
}

impl Default for SurveillanceDashboard {
    fn default() -> Self {
        Self {
            regions: Fetch::Loading,
            trends: Fetch::Loading,
            organisms: Fetch::Loading,
            selected: None,
        }
    }
}

impl SurveillanceDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regions(&self) -> &Fetch<Vec<RegionRecord>> {
        &self.regions
    }

    pub fn trends(&self) -> &Fetch<Vec<TrendPoint>> {
        &self.trends
    }

    pub fn organisms(&self) -> &Fetch<Vec<OrganismShare>> {
        &self.organisms
    }

    /// Mark all three datasets as loading again.
    pub fn begin_reload(&mut self) {
        debug!("surveillance reload");
        self.regions = Fetch::Loading;
        self.trends = Fetch::Loading;
        self.organisms = Fetch::Loading;
    }

    pub fn apply_regions(&mut self, outcome: AmrResult<Vec<RegionRecord>>) {
        self.regions = Fetch::from_outcome("regions", outcome);
    }

    pub fn apply_trends(&mut self, outcome: AmrResult<Vec<TrendPoint>>) {
        self.trends = Fetch::from_outcome("trends", outcome);
    }

    pub fn apply_organisms(&mut self, outcome: AmrResult<Vec<OrganismShare>>) {
        self.organisms = Fetch::from_outcome("organisms", outcome);
    }

    /// Fetch all three datasets concurrently. A failure in one does not
    /// affect the others.
    pub async fn load_all(&mut self, source: &dyn DataSource) {
        self.begin_reload();
        let (regions, trends, organisms) = tokio::join!(
            source.regions(),
            source.trends(),
            source.organism_distribution()
        );
        self.apply_regions(regions);
        self.apply_trends(trends);
        self.apply_organisms(organisms);
    }

    /// Recomputed from the current region list on every call.
    pub fn summary(&self) -> SurveillanceSummary {
        SurveillanceSummary::from_regions(self.regions.items())
    }

    pub fn table(&self) -> Vec<RegionRow> {
        region_rows(self.regions.items())
    }

    /// Open the detail panel for `name`. Returns false if no such region.
    pub fn select_region(&mut self, name: &str) -> bool {
        let found = self.regions.items().iter().find(|r| r.region == name).cloned();
        let opened = found.is_some();
        self.selected = found;
        opened
    }

    pub fn close_region(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&RegionRecord> {
        self.selected.as_ref()
    }
}
