//! Unit categories offered by the interactive form
//!
//! This is presentation metadata only. The converter accepts any pair of
//! identifiers and never consults the catalog.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    Length,
    Weight,
    Temperature,
    Time,
    Volume,
    Currency,
}

impl UnitCategory {
    pub const ALL: [UnitCategory; 6] = [
        UnitCategory::Length,
        UnitCategory::Weight,
        UnitCategory::Temperature,
        UnitCategory::Time,
        UnitCategory::Volume,
        UnitCategory::Currency,
    ];

    /// Unit identifiers offered together for this category.
    pub fn units(&self) -> &'static [&'static str] {
        match self {
            UnitCategory::Length => &["meter", "kilometer", "mile", "yard", "foot", "inch"],
            UnitCategory::Weight => &["gram", "kilogram", "pound", "ounce"],
            UnitCategory::Temperature => &["celsius", "fahrenheit", "kelvin"],
            UnitCategory::Time => &["second", "minute", "hour", "day"],
            UnitCategory::Volume => &["liter", "milliliter", "gallon", "cubic meter"],
            UnitCategory::Currency => &["USD", "EUR", "GBP", "PKR", "INR"],
        }
    }
}

impl Display for UnitCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                UnitCategory::Length => "Length",
                UnitCategory::Weight => "Weight",
                UnitCategory::Temperature => "Temperature",
                UnitCategory::Time => "Time",
                UnitCategory::Volume => "Volume",
                UnitCategory::Currency => "Currency",
            }
        )
    }
}

impl FromStr for UnitCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitCategory::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("Invalid unit category: {}", s))
    }
}
