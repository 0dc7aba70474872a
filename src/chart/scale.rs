//! Time and case axes mapping chart values to braille pixels.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::reshape::CaseFloor;

/// Case axis scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    Linear,
    Log,
}

impl ScaleKind {
    /// Floor for malformed cells; a log axis has no zero
    pub fn floor(self) -> CaseFloor {
        match self {
            ScaleKind::Linear => CaseFloor::Zero,
            ScaleKind::Log => CaseFloor::One,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ScaleKind::Linear => ScaleKind::Log,
            ScaleKind::Log => ScaleKind::Linear,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScaleKind::Linear => "linear",
            ScaleKind::Log => "log",
        }
    }
}

/// Dates onto horizontal braille pixels `[0, width)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub width: usize,
}

impl TimeAxis {
    pub fn new(start: NaiveDate, end: NaiveDate, width: usize) -> Self {
        Self { start, end, width }
    }

    fn span_days(&self) -> f64 {
        (self.end - self.start).num_days().max(1) as f64
    }

    fn last_px(&self) -> f64 {
        self.width.saturating_sub(1).max(1) as f64
    }

    pub fn x(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days() * self.last_px()
    }

    /// Pixel back to the nearest whole day, clamped to the axis
    pub fn date_at(&self, px: f64) -> NaiveDate {
        let days = (px.clamp(0.0, self.last_px()) / self.last_px() * self.span_days()).round();
        self.start + Duration::days(days as i64)
    }
}

/// Case counts onto vertical braille pixels, 0 at the top
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaseAxis {
    pub kind: ScaleKind,
    pub min: f64,
    pub max: f64,
    pub height: usize,
}

impl CaseAxis {
    /// Domain `[floor, max]`; a degenerate domain is widened by one
    pub fn new(kind: ScaleKind, max: u64, height: usize) -> Self {
        let min = kind.floor().value() as f64;
        let max = (max as f64).max(min + 1.0);
        Self {
            kind,
            min,
            max,
            height,
        }
    }

    fn norm(&self, value: f64) -> f64 {
        let v = value.clamp(self.min, self.max);
        match self.kind {
            ScaleKind::Linear => (v - self.min) / (self.max - self.min),
            ScaleKind::Log => (v.log10() - self.min.log10()) / (self.max.log10() - self.min.log10()),
        }
    }

    pub fn y(&self, value: f64) -> f64 {
        let bottom = self.height.saturating_sub(1) as f64;
        bottom - self.norm(value) * bottom
    }

    /// Labels for the top, middle and bottom rows of the axis
    pub fn tick_values(&self) -> [f64; 3] {
        let mid = match self.kind {
            ScaleKind::Linear => (self.min + self.max) / 2.0,
            ScaleKind::Log => (self.min * self.max).sqrt(),
        };
        [self.max, mid, self.min]
    }
}

/// Compact label: 1234 → "1.2k", 3_400_000 → "3.4M"
pub fn compact_count(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}k", value / 1e3)
    } else {
        format!("{value:.0}")
    }
}
