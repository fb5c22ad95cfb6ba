//! Terminal colours derived from the configured palette.

use ratatui::style::Color;

use pathoshield_config::{Palette, Rgb};
use pathoshield_core::charts::TrendTone;

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// The palette as ratatui colours. Built once in `main` and handed to `App`.
#[derive(Debug, Clone)]
pub struct Theme {
    palette: Palette,
}

impl Theme {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn primary(&self) -> Color {
        color(self.palette.primary)
    }

    pub fn secondary(&self) -> Color {
        color(self.palette.secondary)
    }

    pub fn alert(&self) -> Color {
        color(self.palette.alert)
    }

    pub fn improving(&self) -> Color {
        color(self.palette.improving)
    }

    pub fn neutral(&self) -> Color {
        color(self.palette.neutral)
    }

    pub fn chart(&self, index: usize) -> Color {
        color(self.palette.chart_color(index))
    }

    pub fn tone(&self, tone: TrendTone) -> Color {
        match tone {
            TrendTone::Alert => self.alert(),
            TrendTone::Improving => self.improving(),
            TrendTone::Neutral => self.neutral(),
        }
    }
}
