use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// LQ45 tickers covered by the trained models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Instrument {
    Arto,
    Bbca,
    Bbni,
    Bbri,
    Bbtn,
    Bmri,
    Bris,
    Goto,
}

/// Industry grouping used by the attribution panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    Banking,
    Technology,
}

impl Instrument {
    pub const ALL: [Instrument; 8] = [
        Instrument::Arto,
        Instrument::Bbca,
        Instrument::Bbni,
        Instrument::Bbri,
        Instrument::Bbtn,
        Instrument::Bmri,
        Instrument::Bris,
        Instrument::Goto,
    ];

    /// Ticker symbol as it appears in the `relevant_issuer` column
    pub fn symbol(&self) -> &'static str {
        match self {
            Instrument::Arto => "ARTO",
            Instrument::Bbca => "BBCA",
            Instrument::Bbni => "BBNI",
            Instrument::Bbri => "BBRI",
            Instrument::Bbtn => "BBTN",
            Instrument::Bmri => "BMRI",
            Instrument::Bris => "BRIS",
            Instrument::Goto => "GOTO",
        }
    }

    pub fn sector(&self) -> Sector {
        match self {
            Instrument::Goto => Sector::Technology,
            _ => Sector::Banking,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.symbol())
    }
}

impl FromStr for Instrument {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim().to_uppercase();
        Instrument::ALL
            .into_iter()
            .find(|i| i.symbol() == symbol)
            .ok_or_else(|| {
                anyhow!(
                    "Unknown instrument: {}. Must be one of {}",
                    s,
                    Instrument::ALL
                        .iter()
                        .map(|i| i.symbol())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sector::Banking => write!(f, "Banking"),
            Sector::Technology => write!(f, "Technology"),
        }
    }
}
