//! Neuromodulator categories.
//!
//! Names as they appear in annotation files: "DA", "5HT" (or "5-HT"), "NA".
//! Anything else is kept verbatim and drawn in the default color.

use serde::{Deserialize, Deserializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Modulator {
    Dopamine,
    Serotonin,
    Noradrenaline,
    Other(String),
}

impl Modulator {
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "DA" => Modulator::Dopamine,
            "5HT" | "5-HT" => Modulator::Serotonin,
            "NA" => Modulator::Noradrenaline,
            other => Modulator::Other(other.to_string()),
        }
    }

    /// Fill color as RGB.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Modulator::Dopamine => (0xbd, 0xe4, 0xb9),
            Modulator::Serotonin => (0xe9, 0xb9, 0xff),
            Modulator::Noradrenaline | Modulator::Other(_) => (0xff, 0xf4, 0xb9),
        }
    }
}

impl fmt::Display for Modulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modulator::Dopamine => f.write_str("DA"),
            Modulator::Serotonin => f.write_str("5-HT"),
            Modulator::Noradrenaline => f.write_str("NA"),
            Modulator::Other(name) => f.write_str(name),
        }
    }
}

impl<'de> Deserialize<'de> for Modulator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Modulator::from_name(&name))
    }
}
