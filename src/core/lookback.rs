//! Lookback windows and their trading-day offsets

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Lookback {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "YTD")]
    YearToDate,
}

impl Display for Lookback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Lookback::OneDay => "1D",
                Lookback::OneWeek => "1W",
                Lookback::OneMonth => "1M",
                Lookback::ThreeMonths => "3M",
                Lookback::SixMonths => "6M",
                Lookback::YearToDate => "YTD",
            }
        )
    }
}

impl Lookback {
    pub const ALL: [Lookback; 6] = [
        Lookback::OneDay,
        Lookback::OneWeek,
        Lookback::OneMonth,
        Lookback::ThreeMonths,
        Lookback::SixMonths,
        Lookback::YearToDate,
    ];

    /// Number of trading rows between the latest close and the reference close.
    ///
    /// These are fixed approximations of calendar periods; `None` for YTD, which
    /// is anchored on the first trading day of the year instead.
    pub fn trading_days(&self) -> Option<usize> {
        match self {
            Lookback::OneDay => Some(1),
            Lookback::OneWeek => Some(5),
            Lookback::OneMonth => Some(21),
            Lookback::ThreeMonths => Some(63),
            Lookback::SixMonths => Some(126),
            Lookback::YearToDate => None,
        }
    }

    pub fn defaults() -> Vec<Lookback> {
        vec![
            Lookback::OneDay,
            Lookback::OneWeek,
            Lookback::OneMonth,
            Lookback::YearToDate,
        ]
    }

    /// Sorts into display order and drops duplicates.
    pub fn normalize(lookbacks: &[Lookback]) -> Vec<Lookback> {
        let mut out = lookbacks.to_vec();
        out.sort();
        out.dedup();
        out
    }

    /// Parses a comma separated list such as `1d,1w,ytd`.
    pub fn parse_list(list: &str) -> Result<Vec<Lookback>> {
        let parsed = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Lookback::from_str)
            .collect::<Result<Vec<_>>>()?;
        if parsed.is_empty() {
            anyhow::bail!("At least one lookback window is required");
        }
        Ok(Self::normalize(&parsed))
    }
}

impl FromStr for Lookback {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "1D" => Ok(Lookback::OneDay),
            "1W" => Ok(Lookback::OneWeek),
            "1M" => Ok(Lookback::OneMonth),
            "3M" => Ok(Lookback::ThreeMonths),
            "6M" => Ok(Lookback::SixMonths),
            "YTD" => Ok(Lookback::YearToDate),
            _ => Err(anyhow::anyhow!("Invalid lookback window: {}", s)),
        }
    }
}
