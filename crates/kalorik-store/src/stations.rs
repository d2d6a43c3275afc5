//! Station catalog.
//!
//! Each station fixes which table shape a group collects. Labels are part of
//! the stored object names and must not change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::{CellValue, Table};
use crate::error::StoreError;
use crate::naming::sanitize;

/// Table shape collected at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationKind {
    /// One temperature per category, shown as a bar chart.
    BarChart,
    /// Two temperatures over time.
    TimeSeries,
    /// Observation only; no table.
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Station {
    Conduction,
    Convection,
    Radiation,
    ThermosFlask,
    ThermosVsCup,
}

const BAR_COLUMNS: [&str; 3] = ["Kategorie", "Temperatur [°C]", "Bemerkung"];

const SERIES_COLUMNS: [&str; 4] = [
    "Zeit [min]",
    "Temperatur Thermos [°C]",
    "Temperatur Becher [°C]",
    "Bemerkung",
];

impl Station {
    pub fn all() -> [Station; 5] {
        [
            Self::Conduction,
            Self::Convection,
            Self::Radiation,
            Self::ThermosFlask,
            Self::ThermosVsCup,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Conduction => "A – Wärmeleitung",
            Self::Convection => "B – Konvektion",
            Self::Radiation => "C – Wärmestrahlung",
            Self::ThermosFlask => "D – Thermosflasche",
            Self::ThermosVsCup => "E – Vergleich Thermos vs. Becher",
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Self::Conduction => 'A',
            Self::Convection => 'B',
            Self::Radiation => 'C',
            Self::ThermosFlask => 'D',
            Self::ThermosVsCup => 'E',
        }
    }

    pub fn kind(&self) -> StationKind {
        match self {
            Self::Conduction | Self::Radiation => StationKind::BarChart,
            Self::ThermosVsCup => StationKind::TimeSeries,
            Self::Convection | Self::ThermosFlask => StationKind::Observation,
        }
    }

    pub fn collects_table(&self) -> bool {
        self.kind() != StationKind::Observation
    }

    /// Label as it appears in object names.
    pub fn sanitized_label(&self) -> String {
        sanitize(self.label())
    }

    /// Starting table for a group without stored data.
    pub fn template(&self) -> Table {
        match self.kind() {
            StationKind::BarChart => {
                let rows = ["Material 1", "Material 2"]
                    .into_iter()
                    .map(|category| {
                        vec![
                            CellValue::Text(category.to_string()),
                            CellValue::Empty,
                            CellValue::Empty,
                        ]
                    })
                    .collect();
                Table::from_parts(BAR_COLUMNS.map(String::from).to_vec(), rows)
            }
            StationKind::TimeSeries => Table::new(SERIES_COLUMNS),
            StationKind::Observation => Table::default(),
        }
    }

    /// Look up by label, sanitized label, or letter (case-insensitive).
    pub fn from_label(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let mut chars = input.chars();
        if let (Some(letter), None) = (chars.next(), chars.next()) {
            let letter = letter.to_ascii_uppercase();
            return Self::all().into_iter().find(|s| s.letter() == letter);
        }

        let sanitized = sanitize(input);
        Self::all()
            .into_iter()
            .find(|s| s.label() == input || s.sanitized_label() == sanitized)
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Station {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| StoreError::InvalidKey {
            reason: format!("unknown station: {}", s),
        })
    }
}
