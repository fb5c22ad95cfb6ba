//! Rendering.
//!
//! Layout:
//!   ┌─── header ──────────────────────────────────────────────────────────┐
//!   │  PathoShield  [F1] Home  [F2] AMR Prediction ...        ● online    │
//!   ├─── screen body ─────────────────────────────────────────────────────┤
//!   │  Home | Prediction | E-Prescription | Surveillance                  │
//!   ├─────────────────────────────────────────────────────────────────────┤
//!   │  footer (key bindings, status line)                                 │
//!   └─────────────────────────────────────────────────────────────────────┘

use std::borrow::Cow;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution, Points},
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Clear, Dataset, GraphType, List,
        ListItem, ListState, Paragraph, Row, Table, TableState, Wrap,
    },
    Frame,
};

use pathoshield_contracts::health::ConnectionState;
use pathoshield_core::{
    charts::{map_markers, organism_bars, trend_advice, trend_icon, trend_series, TrendTone, MAP_CENTER},
    prediction::PredictionState,
    prescription::PrescriptionState,
    summary::{confidence_bar, render_summary, PRODUCT_NAME, PRODUCT_TAGLINE},
    surveillance::{Fetch, RegionRow},
};

use crate::app::{App, PredictionField, PrescriptionFocus, Screen};

/// Degrees shown around the map centre, as (lat, lng) half-spans.
const MAP_SPAN: (f64, f64) = (7.5, 10.0);

fn panel(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

fn label<'a>(text: impl Into<Cow<'a, str>>) -> Span<'a> {
    Span::styled(text, Style::default().fg(Color::Gray))
}

fn hint<'a>(text: impl Into<Cow<'a, str>>) -> Span<'a> {
    Span::styled(text, Style::default().fg(Color::DarkGray))
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(10),   // screen body
            Constraint::Length(3), // footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app);
    match app.screen {
        Screen::Home => render_home(f, chunks[1], app),
        Screen::Prediction => render_prediction(f, chunks[1], app),
        Screen::Prescription => render_prescription(f, chunks[1], app),
        Screen::Surveillance => render_surveillance(f, chunks[1], app),
    }
    render_footer(f, chunks[2], app);
}

// ── Header & footer ───────────────────────────────────────────────────────────

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let title_style = Style::default()
        .fg(app.theme.primary())
        .add_modifier(Modifier::BOLD);

    let mut spans: Vec<Span> = vec![Span::styled(format!("{PRODUCT_NAME}    "), title_style)];
    for screen in Screen::ALL {
        let style = if app.screen == screen {
            Style::default()
                .fg(Color::Black)
                .bg(app.theme.primary())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[F{}] {}", screen.key(), screen.name()), style));
        spans.push(Span::raw("  "));
    }

    let (dot_color, detail) = match &app.connection {
        ConnectionState::Unknown => (app.theme.neutral(), String::new()),
        ConnectionState::Online { .. } => (app.theme.improving(), String::new()),
        ConnectionState::Offline { reason } => (app.theme.alert(), format!(": {}", truncate(reason, 30))),
    };
    let indicator = Line::from(vec![
        Span::styled("● ", Style::default().fg(dot_color)),
        Span::raw(format!("{} ({}){}", app.connection.label(), app.source_label, detail)),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(indicator.width() as u16 + 1)])
        .split(inner);
    f.render_widget(Paragraph::new(Line::from(spans)), row[0]);
    f.render_widget(Paragraph::new(indicator).alignment(Alignment::Right), row[1]);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(app.theme.primary()));

    let mut spans: Vec<Span> = vec![key(" [F1-F4] "), Span::raw("Screens  ")];
    match app.screen {
        Screen::Home => {}
        Screen::Prediction => {
            spans.extend([
                key("[Tab] "),
                Span::raw("Field  "),
                key("[Enter] "),
                Span::raw("Attach/Run  "),
                key("[^L] "),
                Span::raw("Clear  "),
            ]);
            if app.prediction.result().is_some() {
                spans.extend([key("[^E] "), Span::raw("E-Prescription  ")]);
            }
        }
        Screen::Prescription if app.prescription.displayed().is_some() => {
            spans.extend([key("[s] "), Span::raw("Save  "), key("[Esc] "), Span::raw("Close  ")]);
        }
        Screen::Prescription => {
            spans.extend([
                key("[Tab] "),
                Span::raw("Focus  "),
                key("[↑↓ Enter] "),
                Span::raw("Select  "),
                key("[^R] "),
                Span::raw("Submit  "),
                key("[^L] "),
                Span::raw("Clear  "),
            ]);
        }
        Screen::Surveillance if app.surveillance.selected().is_some() => {
            spans.extend([key("[Esc] "), Span::raw("Close  ")]);
        }
        Screen::Surveillance => {
            spans.extend([
                key("[↑↓] "),
                Span::raw("Region  "),
                key("[Enter] "),
                Span::raw("Details  "),
                key("[r] "),
                Span::raw("Reload  "),
            ]);
        }
    }
    spans.push(key("[^C] "));
    spans.push(Span::raw("Quit"));

    if let Some(status) = &app.status {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(status.as_str(), Style::default().fg(app.theme.alert())));
    }

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(footer, area);
}

// ── Home ──────────────────────────────────────────────────────────────────────

const FEATURES: [(&str, &str, Screen); 4] = [
    (
        "AMR Prediction",
        "Predict antimicrobial resistance based on genomic data and clinical information.",
        Screen::Prediction,
    ),
    (
        "E-Prescription",
        "Generate e-prescriptions using AMR predictions with recommended antibiotics.",
        Screen::Prescription,
    ),
    (
        "Surveillance",
        "Monitor resistance patterns and trends across different regions and time periods.",
        Screen::Surveillance,
    ),
    (
        "Analytics",
        "Analyze resistance data and generate comprehensive reports for research.",
        Screen::Surveillance,
    ),
];

fn render_home(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(6)])
        .split(area);

    let hero = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Antimicrobial Resistance",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Prediction & Surveillance",
            Style::default().fg(app.theme.primary()).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(hint(
            "Advanced platform for predicting and monitoring antimicrobial resistance patterns \
             to support clinical decision-making and public health surveillance.",
        )),
    ];
    f.render_widget(
        Paragraph::new(hero)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(panel(PRODUCT_TAGLINE)),
        rows[0],
    );

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[1]);
    for (i, (title, description, target)) in FEATURES.iter().enumerate() {
        let accent = if *target == Screen::Surveillance {
            app.theme.secondary()
        } else {
            app.theme.primary()
        };
        let body = vec![
            Line::from(""),
            Line::from(Span::raw(*description)),
            Line::from(""),
            Line::from(Span::styled(
                format!("[{}] Open", target.key()),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )),
        ];
        f.render_widget(
            Paragraph::new(body)
                .wrap(Wrap { trim: true })
                .block(panel(title).border_style(Style::default().fg(accent))),
            cards[i],
        );
    }
}

// ── Prediction ────────────────────────────────────────────────────────────────

fn render_prediction(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let form = app.prediction.form();
    let limits = app.prediction.limits();
    let mut lines: Vec<Line> = vec![Line::from(hint(
        "Upload mass spectrometry data and enter clinical information.",
    ))];
    lines.push(Line::from(""));

    for field in PredictionField::ALL {
        let value = match field {
            PredictionField::Sample => app.sample_path.as_str(),
            PredictionField::Organism => form.organism.as_str(),
            PredictionField::Region => form.region.as_str(),
            PredictionField::Age => form.patient_age.as_str(),
            PredictionField::Gender => form.patient_gender.as_str(),
        };
        lines.push(input_line(app, field.label(), value, field.placeholder(), app.prediction_field == field));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(hint(format!(
        "Accepted: {} (max {})",
        limits.accepted_label(),
        limits.max_size_label()
    ))));
    match form.sample() {
        Some(sample) => lines.push(Line::from(vec![
            label("Selected: "),
            Span::styled(
                format!("{} ({} bytes)", sample.file_name, sample.size()),
                Style::default().fg(app.theme.primary()),
            ),
        ])),
        None => lines.push(Line::from(hint("No sample attached"))),
    }
    if let Some(notice) = app.prediction.notice() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(notice, Style::default().fg(app.theme.alert()))));
    }

    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(panel("AMR Prediction")),
        cols[0],
    );

    render_prediction_result(f, cols[1], app);
}

fn input_line<'a>(app: &App, name: &'a str, value: &'a str, placeholder: &'a str, focused: bool) -> Line<'a> {
    let name_style = if focused {
        Style::default().fg(app.theme.primary()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![
        Span::styled(if focused { "▸ " } else { "  " }, name_style),
        Span::styled(format!("{:<16}", name), name_style),
    ];
    if value.is_empty() && !focused {
        spans.push(hint(placeholder));
    } else {
        spans.push(Span::raw(value));
    }
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(app.theme.primary())));
    }
    Line::from(spans)
}

fn render_prediction_result(f: &mut Frame, area: Rect, app: &App) {
    let block = panel("Prediction Results");
    let lines: Vec<Line> = match app.prediction.state() {
        PredictionState::Idle => vec![Line::from(hint(
            "Results will appear here. Fill in the form and press Enter to run a prediction.",
        ))],
        PredictionState::Submitting { .. } => vec![Line::from(Span::styled(
            "Processing...",
            Style::default().fg(app.theme.primary()),
        ))],
        PredictionState::Failure(message) => vec![Line::from(vec![
            Span::styled("Error: ", Style::default().fg(app.theme.alert()).add_modifier(Modifier::BOLD)),
            Span::styled(message.as_str(), Style::default().fg(app.theme.alert())),
        ])],
        PredictionState::Success(result) => {
            let mut lines = vec![
                Line::from(vec![label("Patient ID:        "), Span::raw(result.patient_id.as_str())]),
                Line::from(vec![
                    label("Bacterial Species: "),
                    Span::styled(
                        result.bacterial_species.as_str(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
            ];
            if let Some(region) = &result.region {
                lines.push(Line::from(vec![label("Region:            "), Span::raw(region.as_str())]));
            }
            if let Some(confidence) = result.confidence {
                lines.push(Line::from(vec![
                    label("Confidence:        "),
                    Span::styled(confidence_bar(confidence), Style::default().fg(app.theme.primary())),
                ]));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Susceptible",
                Style::default().fg(app.theme.improving()).add_modifier(Modifier::BOLD),
            )));
            if result.susceptible_antibiotics.is_empty() {
                lines.push(Line::from(hint("  none")));
            }
            for name in &result.susceptible_antibiotics {
                lines.push(Line::from(Span::styled(
                    format!("  ✓ {}", name),
                    Style::default().fg(app.theme.improving()),
                )));
            }
            lines.push(Line::from(Span::styled(
                "Resistant",
                Style::default().fg(app.theme.alert()).add_modifier(Modifier::BOLD),
            )));
            if result.resistant_antibiotics.is_empty() {
                lines.push(Line::from(hint("  none")));
            }
            for name in &result.resistant_antibiotics {
                lines.push(Line::from(Span::styled(
                    format!("  ✗ {}", name),
                    Style::default().fg(app.theme.alert()),
                )));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(hint("Press Ctrl-E to generate an E-Prescription.")));
            lines
        }
    };
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
}

// ── E-Prescription ────────────────────────────────────────────────────────────

fn render_prescription(f: &mut Frame, area: Rect, app: &App) {
    let Some(prediction) = app.prescription.prediction() else {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No Prediction Data Available",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Please run a prediction first to generate an E-Prescription."),
            Line::from(hint("[F2] Go to AMR Prediction")),
        ];
        f.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).block(panel("E-Prescription")),
            area,
        );
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(8)])
        .split(area);

    let mut overview = vec![Line::from(vec![
        label("Bacterial Species: "),
        Span::styled(
            prediction.bacterial_species.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        label("   Patient: "),
        Span::raw(prediction.patient_id.as_str()),
    ])];
    if let Some(region) = &prediction.region {
        overview.push(Line::from(vec![label("Region: "), Span::raw(region.as_str())]));
    }
    f.render_widget(Paragraph::new(overview).block(panel("Prediction Summary")), rows[0]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    render_suggestions(f, cols[0], app);
    render_prescription_form(f, cols[1], app);

    if let Some(prescription) = app.prescription.displayed() {
        let popup = centered_rect(70, 90, area);
        f.render_widget(Clear, popup);
        f.render_widget(
            Paragraph::new(render_summary(prescription))
                .wrap(Wrap { trim: false })
                .block(panel("Prescription").border_style(Style::default().fg(app.theme.primary()))),
            popup,
        );
    }
}

fn render_suggestions(f: &mut Frame, area: Rect, app: &App) {
    let recommendations = app.prescription.recommendations();
    let focused = app.prescription_focus == PrescriptionFocus::Suggestions;
    let selected = app.prescription.selected();

    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),
            Constraint::Length(recommendations.resistant.len().min(6) as u16 + 2),
        ])
        .split(area);

    let block = panel("Recommended Antibiotics (Susceptible)").border_style(Style::default().fg(if focused {
        app.theme.primary()
    } else {
        Color::DarkGray
    }));

    if recommendations.ranked.is_empty() {
        f.render_widget(
            Paragraph::new(hint("No susceptible antibiotics available.")).block(block),
            split[0],
        );
    } else {
        let items: Vec<ListItem> = recommendations
            .ranked
            .iter()
            .map(|entry| {
                let mut spans = vec![Span::raw(entry.name.as_str())];
                for badge in &entry.badges {
                    spans.push(Span::raw(" "));
                    spans.push(Span::styled(
                        format!("[{}]", badge.label()),
                        Style::default().fg(app.theme.secondary()),
                    ));
                }
                if selected == Some(entry.name.as_str()) {
                    spans.push(Span::styled(" ✓", Style::default().fg(app.theme.improving())));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_symbol("▸ ")
            .highlight_style(Style::default().add_modifier(Modifier::BOLD));
        let mut state = ListState::default().with_selected(Some(app.suggestion_cursor));
        f.render_stateful_widget(list, split[0], &mut state);
    }

    let resistant: Vec<ListItem> = recommendations
        .resistant
        .iter()
        .map(|name| {
            ListItem::new(Span::styled(
                format!("✗ {}", name),
                Style::default().fg(app.theme.alert()),
            ))
        })
        .collect();
    f.render_widget(List::new(resistant).block(panel("Not Recommended (Resistant)")), split[1]);
}

fn render_prescription_form(f: &mut Frame, area: Rect, app: &App) {
    let block = panel("Prescription Details");
    let state = app.prescription.state();

    let Some(antibiotic) = state.antibiotic() else {
        f.render_widget(
            Paragraph::new(hint(
                "Please select an antibiotic from the recommendations to create a prescription.",
            ))
            .wrap(Wrap { trim: true })
            .block(block),
            area,
        );
        return;
    };

    let fields = app.prescription.fields();
    let focus = app.prescription_focus;
    let mut lines = vec![
        Line::from(vec![
            label("Selected Antibiotic: "),
            Span::styled(antibiotic, Style::default().fg(app.theme.primary()).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        input_line(app, "Dosage *", &fields.dosage, "e.g., 500mg", focus == PrescriptionFocus::Dosage),
        input_line(
            app,
            "Duration *",
            &fields.duration,
            "e.g., 7 days",
            focus == PrescriptionFocus::Duration,
        ),
        input_line(
            app,
            "Instructions",
            &fields.instructions,
            "e.g., Take with food",
            focus == PrescriptionFocus::Instructions,
        ),
        Line::from(""),
    ];

    if matches!(state, PrescriptionState::Submitting { .. }) {
        lines.push(Line::from(Span::styled(
            "Generating...",
            Style::default().fg(app.theme.primary()),
        )));
    }
    if let Some(notice) = app.prescription.notice() {
        lines.push(Line::from(Span::styled(notice, Style::default().fg(app.theme.alert()))));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
}

// ── Surveillance ──────────────────────────────────────────────────────────────

fn render_surveillance(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Percentage(50),
            Constraint::Min(8),
        ])
        .split(area);

    render_summary_cards(f, rows[0], app);

    let mid = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);
    render_map(f, mid[0], app);
    render_region_table(f, mid[1], app);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[2]);
    render_trend_chart(f, bottom[0], app);
    render_organism_chart(f, bottom[1], app);

    if let Some(region) = app.surveillance.selected() {
        let popup = centered_rect(60, 60, area);
        let tone = app.theme.tone(TrendTone::from(region.trend));
        let lines = vec![
            Line::from(vec![label("Total Cases:     "), Span::raw(region.cases.to_string())]),
            Line::from(vec![
                label("Resistance Rate: "),
                Span::raw(format!("{:.1}%", region.avg_resistance_rate * 100.0)),
            ]),
            Line::from(vec![
                label("Trend:           "),
                Span::styled(
                    format!("{} {}", trend_icon(region.trend), region.trend.as_str()),
                    Style::default().fg(tone).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![label("Location:        "), Span::raw(format!("{:.4}, {:.4}", region.lat, region.lng))]),
            Line::from(""),
            Line::from(label("Organisms Detected")),
            Line::from(format!("  {}", region.organisms.join(", "))),
            Line::from(""),
            Line::from(Span::styled(trend_advice(region.trend), Style::default().fg(tone))),
        ];
        f.render_widget(Clear, popup);
        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(panel(&region.region).border_style(Style::default().fg(tone))),
            popup,
        );
    }
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App) {
    let summary = app.surveillance.summary();
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let stats = [
        ("Total Cases", summary.total_cases.to_string(), app.theme.primary()),
        ("Organisms Tracked", summary.distinct_organisms.to_string(), app.theme.secondary()),
        ("Avg Resistance Rate", summary.average_resistance_label(), app.theme.alert()),
        ("Active Regions", summary.active_regions.to_string(), app.theme.improving()),
    ];
    for (i, (title, value, color)) in stats.into_iter().enumerate() {
        f.render_widget(
            Paragraph::new(Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)))
                .alignment(Alignment::Center)
                .block(panel(title)),
            cards[i],
        );
    }
}

/// Placeholder for a dataset that is still loading or failed to load.
fn fetch_placeholder<T>(fetch: &Fetch<Vec<T>>) -> Option<String> {
    if fetch.is_loading() {
        return Some("Loading...".to_string());
    }
    fetch.error().map(|e| format!("Failed to load: {}", e))
}

fn render_map(f: &mut Frame, area: Rect, app: &App) {
    let markers = map_markers(app.surveillance.regions().items());
    let (lat, lng) = MAP_CENTER;
    let theme = &app.theme;

    let canvas = Canvas::default()
        .block(panel("Resistance Map"))
        .marker(Marker::Braille)
        .x_bounds([lng - MAP_SPAN.1, lng + MAP_SPAN.1])
        .y_bounds([lat - MAP_SPAN.0, lat + MAP_SPAN.0])
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();
            for marker in &markers {
                let color = theme.tone(TrendTone::from(marker.trend));
                ctx.draw(&Points {
                    coords: &[(marker.lng, marker.lat)],
                    color,
                });
                ctx.print(
                    marker.lng + 0.3,
                    marker.lat,
                    Line::from(Span::styled(
                        format!("{} {}", marker.region, trend_icon(marker.trend)),
                        Style::default().fg(color),
                    )),
                );
            }
        });
    f.render_widget(canvas, area);
}

fn render_region_table(f: &mut Frame, area: Rect, app: &App) {
    let block = panel("Regional Data");
    if let Some(text) = fetch_placeholder(app.surveillance.regions()) {
        f.render_widget(Paragraph::new(hint(text)).block(block), area);
        return;
    }

    let table_rows = app.surveillance.table();
    if matches!(table_rows.as_slice(), [RegionRow::NoData]) {
        f.render_widget(Paragraph::new(hint(RegionRow::NO_DATA_TEXT)).block(block), area);
        return;
    }

    let header = Row::new(["Region", "Cases", "Resistance", "Trend", "Organisms"])
        .style(Style::default().fg(app.theme.primary()).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = table_rows
        .into_iter()
        .map(|row| match row {
            RegionRow::Region {
                region,
                cases,
                resistance,
                organisms,
                trend,
            } => Row::new(vec![
                Cell::from(region),
                Cell::from(cases.to_string()),
                Cell::from(resistance),
                Cell::from(Span::styled(
                    format!("{} {}", trend_icon(trend), trend.as_str()),
                    Style::default().fg(app.theme.tone(TrendTone::from(trend))),
                )),
                Cell::from(organisms),
            ]),
            RegionRow::NoData => Row::new(vec![Cell::from(RegionRow::NO_DATA_TEXT)]),
        })
        .collect();

    let widths = [
        Constraint::Length(18),
        Constraint::Length(7),
        Constraint::Length(11),
        Constraint::Length(13),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let selected = (!app.surveillance.regions().items().is_empty()).then_some(app.region_cursor);
    let mut state = TableState::default().with_selected(selected);
    f.render_stateful_widget(table, area, &mut state);
}

fn render_trend_chart(f: &mut Frame, area: Rect, app: &App) {
    let block = panel("Resistance Trends (12 months)");
    if let Some(text) = fetch_placeholder(app.surveillance.trends()) {
        f.render_widget(Paragraph::new(hint(text)).block(block), area);
        return;
    }

    let series = trend_series(app.surveillance.trends().items());
    if series.is_empty() {
        f.render_widget(Paragraph::new(hint("No trend data available")).block(block), area);
        return;
    }

    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.resistance_percent))
        .collect();
    let max = series
        .iter()
        .map(|p| p.resistance_percent)
        .fold(0.0_f64, f64::max)
        .max(10.0)
        .ceil();
    let last = series.len().saturating_sub(1);
    let x_labels = vec![
        series[0].label.clone(),
        series[last / 2].label.clone(),
        series[last].label.clone(),
    ];

    let dataset = Dataset::default()
        .name("Resistance %")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(app.theme.alert()))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, last.max(1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, max])
                .labels(vec!["0%".to_string(), format!("{:.0}%", max / 2.0), format!("{:.0}%", max)]),
        );
    f.render_widget(chart, area);
}

fn render_organism_chart(f: &mut Frame, area: Rect, app: &App) {
    let block = panel("Organism Distribution");
    if let Some(text) = fetch_placeholder(app.surveillance.organisms()) {
        f.render_widget(Paragraph::new(hint(text)).block(block), area);
        return;
    }

    let shaped = organism_bars(app.surveillance.organisms().items());
    if shaped.is_empty() {
        f.render_widget(Paragraph::new(hint("No distribution data available")).block(block), area);
        return;
    }

    let bars: Vec<Bar> = shaped
        .iter()
        .map(|bar| {
            let color = app.theme.chart(bar.palette_index);
            Bar::default()
                .value(bar.cases)
                .label(Line::from(bar.organism.clone()))
                .text_value(format!("{} ({:.1}%)", bar.cases, bar.percentage))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(13)
        .bar_gap(2);
    f.render_widget(chart, area);
}

// ── Utility helpers ───────────────────────────────────────────────────────────

/// A rectangle of `percent_x` × `percent_y` centred in `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Truncate a string to at most `max` chars, appending "…" if truncated.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    use pathoshield_config::ConsoleConfig;
    use pathoshield_contracts::prediction::PredictionResult;
    use pathoshield_mock::MockDataSource;

    use super::*;
    use crate::app::TaskResult;
    use crate::theme::Theme;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = ConsoleConfig::default();
        let theme = Theme::new(config.theme.palette().unwrap());
        App::new(Arc::new(MockDataSource::empty(2)), theme, &config, tx)
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 60, area);
        assert!(popup.x >= 20 && popup.right() <= 80);
        assert!(popup.y >= 10 && popup.bottom() <= 40);
    }

    #[tokio::test]
    async fn home_lists_features() {
        let text = screen_text(&app());
        assert!(text.contains("PathoShield"));
        assert!(text.contains("AMR Prediction"));
        assert!(text.contains("checking"));
    }

    #[tokio::test]
    async fn empty_regions_show_no_data_row() {
        let mut app = app();
        app.navigate(Screen::Surveillance);
        app.apply(TaskResult::Regions {
            generation: 1,
            outcome: Ok(vec![]),
        });
        let text = screen_text(&app);
        assert!(text.contains(RegionRow::NO_DATA_TEXT));
        assert!(text.contains("0.0%"));
    }

    #[tokio::test]
    async fn prescription_without_prediction_shows_placeholder() {
        let mut app = app();
        app.navigate(Screen::Prescription);
        assert!(screen_text(&app).contains("No Prediction Data Available"));

        app.prescription.load_prediction(PredictionResult {
            bacterial_species: "K. pneumoniae".to_string(),
            susceptible_antibiotics: vec!["Amoxicillin".to_string()],
            resistant_antibiotics: vec!["Gentamicin".to_string()],
            region: None,
            confidence: None,
            patient_id: "PAT-30000".to_string(),
        });
        let text = screen_text(&app);
        assert!(text.contains("K. pneumoniae"));
        assert!(text.contains("✗ Gentamicin"));
    }
}
