//! Markets screened by the batch ranker.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A market index whose constituents form one screening basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    Kospi,
    Kosdaq,
    Nasdaq,
    Sp500,
}

impl Market {
    /// All markets in screening order.
    pub const ALL: [Market; 4] = [Market::Kospi, Market::Kosdaq, Market::Nasdaq, Market::Sp500];

    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Kospi => "KOSPI",
            Market::Kosdaq => "KOSDAQ",
            Market::Nasdaq => "NASDAQ",
            Market::Sp500 => "SP500",
        }
    }

    /// Index symbol conventionally used as this market's benchmark.
    pub fn default_benchmark(&self) -> &'static str {
        match self {
            Market::Kospi => "^KS11",
            Market::Kosdaq => "^KQ11",
            Market::Nasdaq => "^IXIC",
            Market::Sp500 => "^GSPC",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown market '{0}' (expected KOSPI, KOSDAQ, NASDAQ or SP500)")]
pub struct ParseMarketError(pub String);

impl FromStr for Market {
    type Err = ParseMarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(['&', ' ', '-'], "").as_str() {
            "KOSPI" => Ok(Market::Kospi),
            "KOSDAQ" => Ok(Market::Kosdaq),
            "NASDAQ" => Ok(Market::Nasdaq),
            "SP500" => Ok(Market::Sp500),
            _ => Err(ParseMarketError(s.to_string())),
        }
    }
}
