//! Application state and key handling.
//!
//! Backend calls never run on the event loop. Each one is spawned as a
//! tokio task that reports back through `TaskResult`, tagged with the ticket
//! (or surveillance generation) it was issued under, so that responses for
//! a cleared form or an abandoned screen are dropped.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use pathoshield_config::ConsoleConfig;
use pathoshield_contracts::{
    error::{AmrError, AmrResult},
    health::ConnectionState,
    prediction::PredictionResult,
    prescription::Prescription,
    surveillance::{OrganismShare, RegionRecord, TrendPoint},
};
use pathoshield_core::{
    summary::write_summary, DataSource, PredictionWorkflow, PrescriptionWorkflow, SurveillanceDashboard,
};

use crate::theme::Theme;

// ── Navigation ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Prediction,
    Prescription,
    Surveillance,
}

impl Screen {
    pub const ALL: [Screen; 4] = [
        Screen::Home,
        Screen::Prediction,
        Screen::Prescription,
        Screen::Surveillance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Prediction => "AMR Prediction",
            Screen::Prescription => "E-Prescription",
            Screen::Surveillance => "Surveillance",
        }
    }

    /// Function key that opens the screen (F1–F4).
    pub fn key(self) -> u8 {
        match self {
            Screen::Home => 1,
            Screen::Prediction => 2,
            Screen::Prescription => 3,
            Screen::Surveillance => 4,
        }
    }

    fn from_key(n: u8) -> Option<Screen> {
        Screen::ALL.into_iter().find(|s| s.key() == n)
    }

    /// Screens without text inputs also accept plain digits and `q`.
    fn accepts_shortcuts(self) -> bool {
        matches!(self, Screen::Home | Screen::Surveillance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionField {
    Sample,
    Organism,
    Region,
    Age,
    Gender,
}

impl PredictionField {
    pub const ALL: [PredictionField; 5] = [
        PredictionField::Sample,
        PredictionField::Organism,
        PredictionField::Region,
        PredictionField::Age,
        PredictionField::Gender,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PredictionField::Sample => "Sample file",
            PredictionField::Organism => "Organism *",
            PredictionField::Region => "Region",
            PredictionField::Age => "Patient Age",
            PredictionField::Gender => "Patient Gender",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            PredictionField::Sample => "path to .txt or .csv, Enter to attach",
            PredictionField::Organism => "e.g., E. coli, S. aureus",
            PredictionField::Region => "e.g., Punjab, Sindh",
            PredictionField::Age => "Age in years",
            PredictionField::Gender => "Male, Female, Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrescriptionFocus {
    Suggestions,
    Dosage,
    Duration,
    Instructions,
}

impl PrescriptionFocus {
    pub const ALL: [PrescriptionFocus; 4] = [
        PrescriptionFocus::Suggestions,
        PrescriptionFocus::Dosage,
        PrescriptionFocus::Duration,
        PrescriptionFocus::Instructions,
    ];
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let i = all.iter().position(|x| *x == current).unwrap_or(0);
    let n = all.len();
    if forward {
        all[(i + 1) % n]
    } else {
        all[(i + n - 1) % n]
    }
}

/// Apply a key to a single-line text buffer. Returns false if the key is
/// not an editing key.
fn edit(buffer: &mut String, code: KeyCode) -> bool {
    match code {
        KeyCode::Char(c) => buffer.push(c),
        KeyCode::Backspace => {
            buffer.pop();
        }
        _ => return false,
    }
    true
}

// ── Task results ──────────────────────────────────────────────────────────────

/// What a spawned backend call sends back to the event loop.
#[derive(Debug)]
pub enum TaskResult {
    Prediction {
        ticket: u64,
        outcome: AmrResult<PredictionResult>,
    },
    Prescription {
        ticket: u64,
        outcome: AmrResult<Prescription>,
    },
    Regions {
        generation: u64,
        outcome: AmrResult<Vec<RegionRecord>>,
    },
    Trends {
        generation: u64,
        outcome: AmrResult<Vec<TrendPoint>>,
    },
    Organisms {
        generation: u64,
        outcome: AmrResult<Vec<OrganismShare>>,
    },
}

// ── App state ─────────────────────────────────────────────────────────────────

pub struct App {
    pub screen: Screen,
    pub theme: Theme,
    pub connection: ConnectionState,
    pub source_label: String,
    /// One-line message in the footer, replaced by the next one.
    pub status: Option<String>,
    pub should_quit: bool,

    pub prediction: PredictionWorkflow,
    pub prediction_field: PredictionField,
    /// Path typed into the sample field; attached on Enter.
    pub sample_path: String,

    pub prescription: PrescriptionWorkflow,
    pub prescription_focus: PrescriptionFocus,
    /// Highlighted row of the suggestion list.
    pub suggestion_cursor: usize,

    pub surveillance: SurveillanceDashboard,
    pub region_cursor: usize,
    surveillance_generation: u64,

    source: Arc<dyn DataSource>,
    output_dir: PathBuf,
    tx: UnboundedSender<TaskResult>,
}

impl App {
    pub fn new(
        source: Arc<dyn DataSource>,
        theme: Theme,
        config: &ConsoleConfig,
        tx: UnboundedSender<TaskResult>,
    ) -> Self {
        Self {
            screen: Screen::Home,
            theme,
            connection: ConnectionState::Unknown,
            source_label: source.label().to_string(),
            status: None,
            should_quit: false,
            prediction: PredictionWorkflow::new(config.upload.limits()),
            prediction_field: PredictionField::Sample,
            sample_path: String::new(),
            prescription: PrescriptionWorkflow::new(),
            prescription_focus: PrescriptionFocus::Suggestions,
            suggestion_cursor: 0,
            surveillance: SurveillanceDashboard::new(),
            region_cursor: 0,
            surveillance_generation: 0,
            source,
            output_dir: config.output.prescription_dir.clone(),
            tx,
        }
    }

    pub fn navigate(&mut self, screen: Screen) {
        if screen == self.screen {
            return;
        }
        if self.screen == Screen::Prediction {
            self.prediction.leave();
        }
        debug!(from = self.screen.name(), to = screen.name(), "navigate");
        self.screen = screen;
        self.status = None;
        if screen == Screen::Surveillance {
            self.reload_surveillance();
        }
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
                return;
            }
            KeyCode::F(n) => {
                if let Some(screen) = Screen::from_key(n) {
                    self.navigate(screen);
                }
                return;
            }
            KeyCode::Char('q') if self.screen.accepts_shortcuts() => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char(c @ '1'..='4') if self.screen.accepts_shortcuts() => {
                if let Some(screen) = c.to_digit(10).and_then(|d| Screen::from_key(d as u8)) {
                    self.navigate(screen);
                }
                return;
            }
            _ => {}
        }

        match self.screen {
            Screen::Home => {}
            Screen::Prediction => self.prediction_key(key.code, ctrl),
            Screen::Prescription => self.prescription_key(key.code, ctrl),
            Screen::Surveillance => self.surveillance_key(key.code),
        }
    }

    fn prediction_key(&mut self, code: KeyCode, ctrl: bool) {
        match code {
            KeyCode::Char('l') if ctrl => {
                self.prediction.clear();
                self.sample_path.clear();
                self.prediction_field = PredictionField::Sample;
            }
            KeyCode::Char('e') if ctrl => self.open_prescription(),
            KeyCode::Char('r') if ctrl => self.submit_prediction(),
            KeyCode::Tab | KeyCode::Down => {
                self.prediction_field = cycle(&PredictionField::ALL, self.prediction_field, true)
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.prediction_field = cycle(&PredictionField::ALL, self.prediction_field, false)
            }
            KeyCode::Enter if self.prediction_field == PredictionField::Sample => self.attach_sample(),
            KeyCode::Enter => self.submit_prediction(),
            code if !ctrl => {
                let buffer = match self.prediction_field {
                    PredictionField::Sample => &mut self.sample_path,
                    PredictionField::Organism => &mut self.prediction.form_mut().organism,
                    PredictionField::Region => &mut self.prediction.form_mut().region,
                    PredictionField::Age => &mut self.prediction.form_mut().patient_age,
                    PredictionField::Gender => &mut self.prediction.form_mut().patient_gender,
                };
                edit(buffer, code);
            }
            _ => {}
        }
    }

    fn prescription_key(&mut self, code: KeyCode, ctrl: bool) {
        if self.prescription.displayed().is_some() {
            match code {
                KeyCode::Esc | KeyCode::Enter => {
                    if let Err(e) = self.prescription.close_summary() {
                        self.status = Some(e.to_string());
                    }
                }
                KeyCode::Char('s') | KeyCode::Char('p') => self.save_summary(),
                _ => {}
            }
            return;
        }

        match code {
            KeyCode::Tab => {
                self.prescription_focus = cycle(&PrescriptionFocus::ALL, self.prescription_focus, true)
            }
            KeyCode::BackTab => {
                self.prescription_focus = cycle(&PrescriptionFocus::ALL, self.prescription_focus, false)
            }
            KeyCode::Char('l') if ctrl => {
                if let Err(e) = self.prescription.clear_fields() {
                    self.status = Some(e.to_string());
                }
            }
            KeyCode::Char('r') if ctrl => self.submit_prescription(),
            _ if self.prescription_focus == PrescriptionFocus::Suggestions => match code {
                KeyCode::Up => self.suggestion_cursor = self.suggestion_cursor.saturating_sub(1),
                KeyCode::Down => {
                    let last = self.prescription.recommendations().ranked.len().saturating_sub(1);
                    self.suggestion_cursor = (self.suggestion_cursor + 1).min(last);
                }
                KeyCode::Enter | KeyCode::Char(' ') => self.select_suggestion(),
                _ => {}
            },
            KeyCode::Enter => self.submit_prescription(),
            code if !ctrl => {
                let focus = self.prescription_focus;
                match self.prescription.fields_mut() {
                    Ok(fields) => {
                        let buffer = match focus {
                            PrescriptionFocus::Dosage => &mut fields.dosage,
                            PrescriptionFocus::Duration => &mut fields.duration,
                            _ => &mut fields.instructions,
                        };
                        edit(buffer, code);
                    }
                    Err(e) => self.status = Some(e.to_string()),
                }
            }
            _ => {}
        }
    }

    fn surveillance_key(&mut self, code: KeyCode) {
        if self.surveillance.selected().is_some() {
            if code == KeyCode::Esc {
                self.surveillance.close_region();
            }
            return;
        }
        match code {
            KeyCode::Up => self.region_cursor = self.region_cursor.saturating_sub(1),
            KeyCode::Down => {
                let last = self.surveillance.regions().items().len().saturating_sub(1);
                self.region_cursor = (self.region_cursor + 1).min(last);
            }
            KeyCode::Enter => {
                let name = self
                    .surveillance
                    .regions()
                    .items()
                    .get(self.region_cursor)
                    .map(|r| r.region.clone());
                if let Some(name) = name {
                    self.surveillance.select_region(&name);
                }
            }
            KeyCode::Char('r') => self.reload_surveillance(),
            _ => {}
        }
    }

    // ── Prediction ────────────────────────────────────────────────────────────

    fn attach_sample(&mut self) {
        let raw = self.sample_path.trim();
        if raw.is_empty() {
            return;
        }
        // A rejected sample is reported through the workflow notice.
        match self.prediction.attach_path(Path::new(raw)) {
            Ok(()) => {
                self.status = None;
                self.prediction_field = PredictionField::Organism;
            }
            Err(e @ AmrError::Io { .. }) => {
                warn!(path = %raw, error = %e, "sample could not be read");
                self.status = Some(e.to_string());
            }
            Err(_) => {}
        }
    }

    fn submit_prediction(&mut self) {
        let (ticket, request) = match self.prediction.begin_submit() {
            Ok(pair) => pair,
            Err(e) => {
                if self.prediction.notice().is_none() {
                    self.status = Some(e.to_string());
                }
                return;
            }
        };
        self.status = None;

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = source.run_prediction(&request).await;
            let _ = tx.send(TaskResult::Prediction { ticket, outcome });
        });
    }

    /// Hand the current result to the E-Prescription screen.
    fn open_prescription(&mut self) {
        match self.prediction.handoff() {
            Some(result) => {
                self.prescription.load_prediction(result);
                self.prescription_focus = PrescriptionFocus::Suggestions;
                self.suggestion_cursor = 0;
                self.navigate(Screen::Prescription);
            }
            None => self.status = Some("Run a prediction first".to_string()),
        }
    }

    // ── Prescription ──────────────────────────────────────────────────────────

    fn select_suggestion(&mut self) {
        let Some(name) = self
            .prescription
            .recommendations()
            .name_at(self.suggestion_cursor)
            .map(str::to_string)
        else {
            return;
        };
        match self.prescription.select(&name) {
            Ok(()) => {
                self.status = None;
                self.prescription_focus = PrescriptionFocus::Dosage;
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn submit_prescription(&mut self) {
        let (ticket, draft) = match self.prescription.begin_submit() {
            Ok(pair) => pair,
            Err(e) => {
                self.status = Some(e.to_string());
                return;
            }
        };
        self.status = None;

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = source.create_prescription(&draft).await;
            let _ = tx.send(TaskResult::Prescription { ticket, outcome });
        });
    }

    fn save_summary(&mut self) {
        let Some(prescription) = self.prescription.displayed() else {
            return;
        };
        self.status = Some(match write_summary(prescription, &self.output_dir) {
            Ok(path) => format!("Saved to {}", path.display()),
            Err(e) => e.to_string(),
        });
    }

    // ── Surveillance ──────────────────────────────────────────────────────────

    pub fn reload_surveillance(&mut self) {
        self.surveillance_generation += 1;
        let generation = self.surveillance_generation;
        self.surveillance.begin_reload();
        self.region_cursor = 0;
        debug!(generation, "surveillance reload");

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let regions = async {
                let outcome = source.regions().await;
                let _ = tx.send(TaskResult::Regions { generation, outcome });
            };
            let trends = async {
                let outcome = source.trends().await;
                let _ = tx.send(TaskResult::Trends { generation, outcome });
            };
            let organisms = async {
                let outcome = source.organism_distribution().await;
                let _ = tx.send(TaskResult::Organisms { generation, outcome });
            };
            tokio::join!(regions, trends, organisms);
        });
    }

    // ── Results ───────────────────────────────────────────────────────────────

    pub fn apply(&mut self, result: TaskResult) {
        match result {
            TaskResult::Prediction { ticket, outcome } => {
                self.prediction.complete(ticket, outcome);
            }
            TaskResult::Prescription { ticket, outcome } => {
                if self.prescription.complete(ticket, outcome) {
                    if let Some(p) = self.prescription.displayed() {
                        info!(prescription_id = %p.prescription_id, "summary opened");
                    }
                }
            }
            TaskResult::Regions { generation, outcome } => {
                if self.is_current(generation) {
                    self.surveillance.apply_regions(outcome);
                }
            }
            TaskResult::Trends { generation, outcome } => {
                if self.is_current(generation) {
                    self.surveillance.apply_trends(outcome);
                }
            }
            TaskResult::Organisms { generation, outcome } => {
                if self.is_current(generation) {
                    self.surveillance.apply_organisms(outcome);
                }
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        let current = generation == self.surveillance_generation;
        if !current {
            warn!(generation, "dropping stale surveillance response");
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEvent;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use pathoshield_contracts::prediction::SampleFile;
    use pathoshield_contracts::surveillance::Trend;
    use pathoshield_core::prediction::PredictionState;
    use pathoshield_core::surveillance::Fetch;
    use pathoshield_mock::MockDataSource;

    use super::*;

    fn app() -> (App, UnboundedReceiver<TaskResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let config = ConsoleConfig::default();
        let theme = Theme::new(config.theme.palette().unwrap());
        let app = App::new(Arc::new(MockDataSource::empty(11)), theme, &config, tx);
        (app, rx)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, c: char) {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn prediction() -> PredictionResult {
        PredictionResult {
            bacterial_species: "E. coli".to_string(),
            susceptible_antibiotics: vec!["Meropenem".to_string(), "Amoxicillin".to_string()],
            resistant_antibiotics: vec!["Ciprofloxacin".to_string()],
            region: Some("Punjab".to_string()),
            confidence: Some(90.0),
            patient_id: "PAT-20000".to_string(),
        }
    }

    #[tokio::test]
    async fn function_keys_switch_screens() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::F(2));
        assert_eq!(app.screen, Screen::Prediction);

        // Digits are text on the prediction screen.
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.screen, Screen::Prediction);
        assert_eq!(app.prediction.form().organism, "4");

        press(&mut app, KeyCode::F(1));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn empty_organism_blocks_submission() {
        let (mut app, mut rx) = app();
        press(&mut app, KeyCode::F(2));
        ctrl(&mut app, 'r');

        assert_eq!(app.prediction.notice(), Some("organism: Please select an organism"));
        assert!(!app.prediction.is_submitting());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn prediction_round_trip_then_handoff() {
        let (mut app, mut rx) = app();
        press(&mut app, KeyCode::F(2));
        app.prediction
            .attach_sample(SampleFile::new("run.csv", b"1,2".to_vec()))
            .unwrap();
        app.prediction_field = PredictionField::Organism;
        type_text(&mut app, "E. coli");
        press(&mut app, KeyCode::Enter);
        assert!(app.prediction.is_submitting());

        let result = rx.recv().await.unwrap();
        app.apply(result);
        assert!(matches!(app.prediction.state(), PredictionState::Success(_)));

        ctrl(&mut app, 'e');
        assert_eq!(app.screen, Screen::Prescription);
        assert_eq!(app.prescription.prediction().unwrap().bacterial_species, "E. coli");
    }

    #[tokio::test]
    async fn response_after_clear_is_ignored() {
        let (mut app, mut rx) = app();
        press(&mut app, KeyCode::F(2));
        app.prediction
            .attach_sample(SampleFile::new("run.csv", b"1,2".to_vec()))
            .unwrap();
        app.prediction.form_mut().organism = "E. coli".to_string();
        ctrl(&mut app, 'r');
        ctrl(&mut app, 'l');

        let result = rx.recv().await.unwrap();
        app.apply(result);
        assert_eq!(app.prediction.state(), &PredictionState::Idle);
    }

    #[tokio::test]
    async fn prescription_flow_opens_and_closes_summary() {
        let (mut app, mut rx) = app();
        app.prescription.load_prediction(prediction());
        app.navigate(Screen::Prescription);

        // Amoxicillin ranks first.
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.prescription.selected(), Some("Amoxicillin"));
        assert_eq!(app.prescription_focus, PrescriptionFocus::Dosage);

        type_text(&mut app, "250mg");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "7 days");
        press(&mut app, KeyCode::Enter);

        let result = rx.recv().await.unwrap();
        app.apply(result);
        let shown = app.prescription.displayed().unwrap();
        assert_eq!(shown.dosage, "250mg");
        assert_eq!(shown.duration, "7 days");

        press(&mut app, KeyCode::Esc);
        assert!(app.prescription.displayed().is_none());
        assert_eq!(app.prescription.fields().dosage, "");
    }

    #[tokio::test]
    async fn missing_dosage_is_reported() {
        let (mut app, mut rx) = app();
        app.prescription.load_prediction(prediction());
        app.navigate(Screen::Prescription);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.status.as_deref(), Some("dosage: Please enter dosage"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_surveillance_generation_is_dropped() {
        let (mut app, _rx) = app();
        app.reload_surveillance();
        app.reload_surveillance();

        app.apply(TaskResult::Regions {
            generation: 1,
            outcome: Ok(vec![]),
        });
        assert!(app.surveillance.regions().is_loading());

        app.apply(TaskResult::Regions {
            generation: 2,
            outcome: Ok(vec![]),
        });
        assert_eq!(app.surveillance.regions(), &Fetch::Loaded(vec![]));
    }

    #[tokio::test]
    async fn region_detail_opens_and_closes() {
        let (mut app, _rx) = app();
        app.navigate(Screen::Surveillance);
        app.apply(TaskResult::Regions {
            generation: 1,
            outcome: Ok(vec![RegionRecord {
                region: "Sindh".to_string(),
                lat: 24.8607,
                lng: 67.0011,
                cases: 12,
                avg_resistance_rate: 0.3,
                organisms: vec!["E. coli".to_string()],
                trend: Trend::Increasing,
            }]),
        });

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.surveillance.selected().map(|r| r.region.as_str()), Some("Sindh"));
        press(&mut app, KeyCode::Esc);
        assert!(app.surveillance.selected().is_none());
    }
}
