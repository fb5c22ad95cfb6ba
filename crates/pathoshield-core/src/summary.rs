//! Printable prescription summary.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::info;

use pathoshield_contracts::{
    error::{AmrError, AmrResult},
    prescription::Prescription,
};

const RULE_WIDTH: usize = 60;
const BAR_WIDTH: usize = 30;

pub const PRODUCT_NAME: &str = "PathoShield";
pub const PRODUCT_TAGLINE: &str = "AMR Prediction & E-Prescription System";
pub const DISCLAIMER: &str = "This prescription is generated based on AMR prediction results. \
Please review and verify all information before prescribing.";

/// "March 14, 2026", or the raw string when it does not parse.
pub fn display_date(prescription: &Prescription) -> String {
    match prescription.issued_on() {
        Some(day) => day.format("%B %-d, %Y").to_string(),
        None => prescription.date.clone(),
    }
}

/// A fixed-width bar such as `[███████░░░] 70.0%`. Values are clamped to 0–100.
pub fn confidence_bar(confidence: f64) -> String {
    let clamped = confidence.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:.1}%",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        clamped
    )
}

/// Render the prescription as plain text, ready to print or save.
pub fn render_summary(p: &Prescription) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "{PRODUCT_NAME}");
    let _ = writeln!(out, "{PRODUCT_TAGLINE}");
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "Date:            {}", display_date(p));
    let _ = writeln!(out, "Prescription ID: {}", p.prescription_id);
    let _ = writeln!(out, "{light}");

    let _ = writeln!(out, "Patient Information");
    let _ = writeln!(out, "  Patient ID:        {}", p.patient_id);
    let _ = writeln!(out, "Clinical Information");
    let _ = writeln!(out, "  Bacterial Species: {}", p.bacterial_species);
    if let Some(region) = &p.region {
        let _ = writeln!(out, "  Region:            {region}");
    }
    let _ = writeln!(out, "{light}");

    let _ = writeln!(out, "Prescription");
    let _ = writeln!(out, "  Antibiotic:   {}", p.antibiotic);
    let _ = writeln!(out, "  Dosage:       {}", p.dosage);
    let _ = writeln!(out, "  Duration:     {}", p.duration);
    if let Some(instructions) = p.instructions.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(out, "  Instructions:");
        for line in instructions.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }

    if let Some(confidence) = p.confidence {
        let _ = writeln!(out, "{light}");
        let _ = writeln!(out, "Prediction Confidence");
        let _ = writeln!(out, "  {}", confidence_bar(confidence));
    }

    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "{DISCLAIMER}");
    out
}

/// File name used when a prescription is saved.
pub fn summary_file_name(p: &Prescription) -> String {
    let safe: String = p
        .prescription_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("prescription-{safe}.txt")
}

/// Write the summary into `dir`, creating it if needed. Returns the path.
pub fn write_summary(p: &Prescription, dir: &Path) -> AmrResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| AmrError::Io {
        reason: format!("cannot create {}: {}", dir.display(), e),
    })?;
    let path = dir.join(summary_file_name(p));
    std::fs::write(&path, render_summary(p)).map_err(|e| AmrError::Io {
        reason: format!("cannot write {}: {}", path.display(), e),
    })?;
    info!(path = %path.display(), prescription_id = %p.prescription_id, "prescription saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prescription() -> Prescription {
        Prescription {
            prescription_id: "PRES-1710408413589".to_string(),
            patient_id: "PAT-12345".to_string(),
            date: "2026-03-04T09:26:53.589793".to_string(),
            bacterial_species: "K. pneumoniae".to_string(),
            region: Some("Sindh".to_string()),
            antibiotic: "Meropenem".to_string(),
            dosage: "1g IV".to_string(),
            duration: "10 days".to_string(),
            instructions: Some("Every 8 hours\nMonitor renal function".to_string()),
            confidence: Some(91.3),
        }
    }

    #[test]
    fn date_uses_long_month_without_padding() {
        assert_eq!(display_date(&prescription()), "March 4, 2026");
    }

    #[test]
    fn unparseable_date_is_shown_raw() {
        let mut p = prescription();
        p.date = "sometime".to_string();
        assert_eq!(display_date(&p), "sometime");
    }

    #[test]
    fn confidence_bar_is_clamped() {
        assert!(confidence_bar(150.0).ends_with("100.0%"));
        assert!(confidence_bar(-3.0).starts_with("[░"));
        assert_eq!(confidence_bar(50.0).matches('█').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn summary_contains_every_section() {
        let text = render_summary(&prescription());
        assert!(text.contains("PathoShield"));
        assert!(text.contains("Prescription ID: PRES-1710408413589"));
        assert!(text.contains("1g IV"));
        assert!(text.contains("    Monitor renal function"));
        assert!(text.contains("Prediction Confidence"));
        assert!(text.trim_end().ends_with("before prescribing."));
    }

    #[test]
    fn optional_sections_are_omitted() {
        let mut p = prescription();
        p.instructions = None;
        p.confidence = None;
        let text = render_summary(&p);
        assert!(!text.contains("Instructions"));
        assert!(!text.contains("Prediction Confidence"));
    }

    #[test]
    fn file_name_is_sanitised() {
        let mut p = prescription();
        p.prescription_id = "PRES/../1".to_string();
        assert_eq!(summary_file_name(&p), "prescription-PRES____1.txt");
    }

    #[test]
    fn write_summary_creates_directory() {
        let dir = std::env::temp_dir().join(format!("pathoshield-summary-{}", std::process::id()));
        let path = write_summary(&prescription(), &dir.join("nested")).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Meropenem"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
