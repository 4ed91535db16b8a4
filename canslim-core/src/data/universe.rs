//! Symbol universes: which symbols make up each market basket.
//!
//! Live retrieval of index constituents is not supported. Every market has a
//! built-in representative list, and a TOML universe file can replace any of
//! them or define named sector baskets for caution analysis:
//!
//! ```toml
//! [markets]
//! KOSPI = ["005930.KS", "000660.KS"]
//!
//! [sectors]
//! semiconductors = ["005930.KS", "000660.KS", "NVDA"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::provider::SymbolSource;
use crate::domain::Market;

const KOSPI: &[&str] = &[
    "005930.KS", "000660.KS", "035420.KS", "005380.KS", "006400.KS", "051910.KS", "035720.KS",
    "028260.KS", "068270.KS", "207940.KS",
];

const KOSDAQ: &[&str] = &["122630.KQ", "091990.KQ", "067310.KQ", "086900.KQ", "041510.KQ"];

const NASDAQ: &[&str] = &[
    "AAPL", "MSFT", "AMZN", "TSLA", "GOOGL", "GOOG", "META", "NVDA", "NFLX", "ADBE", "PYPL",
    "INTC", "CMCSA", "PEP", "COST", "TMUS", "AVGO", "TXN", "QCOM", "CHTR", "SBUX", "GILD",
    "MDLZ", "FISV", "BKNG", "INTU", "ISRG", "ADP", "VRTX", "CSX", "ATVI", "REGN", "AMD", "MU",
    "AMAT", "LRCX", "ADI", "KLAC", "MRVL", "ORLY", "CDNS", "SNPS", "CTAS", "WDAY", "IDXX",
    "NXPI", "LULU", "EXC", "DXCM", "TEAM", "ZS", "CRWD", "MRNA", "BIIB", "SIRI", "ILMN", "MELI",
    "ROST", "KDP", "CEG", "FAST", "VRSK", "AEP", "PAYX", "CPRT", "PCAR", "ODFL", "CSGP", "MNST",
    "XEL", "DLTR", "ANSS", "TTD", "FANG", "WBD", "SGEN", "ALGN", "CTSH", "FTNT", "VRSN", "ABNB",
    "ADSK", "ASML", "DOCU", "EBAY", "HOOD", "LYFT", "NTES", "OKTA", "ROKU", "SHOP", "SPLK",
    "SPOT", "SQ", "UBER", "ZM", "COIN", "DOCN", "DDOG", "NET", "SNOW", "TWLO", "PLTR", "RBLX",
    "SE", "GRAB", "BABA", "JD", "PDD", "BILI", "TCOM", "WIX", "FVRR", "UPWK", "ETSY", "PINS",
    "SNAP", "TWTR", "DBX", "BOX", "ZEN", "NOW", "CRM", "ORCL", "SAP", "VMW", "RHT", "PANW",
    "CYBR", "S", "VEEV", "NTNX", "MDB", "FSLY", "ESTC",
];

const SP500: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "BRK-B", "UNH", "JNJ", "V", "PG",
    "JPM", "HD", "CVX", "MA", "PFE", "ABBV", "BAC", "KO",
];

/// Built-in representative symbol lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSymbolSource;

impl StaticSymbolSource {
    pub fn symbols(market: Market) -> &'static [&'static str] {
        match market {
            Market::Kospi => KOSPI,
            Market::Kosdaq => KOSDAQ,
            Market::Nasdaq => NASDAQ,
            Market::Sp500 => SP500,
        }
    }
}

impl SymbolSource for StaticSymbolSource {
    fn list_symbols(&self, market: Market) -> Vec<String> {
        Self::symbols(market).iter().map(|s| s.to_string()).collect()
    }
}

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize universe: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Market and sector baskets loaded from TOML.
///
/// Markets missing from the file fall back to the built-in lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    #[serde(default)]
    pub markets: BTreeMap<Market, Vec<String>>,
    #[serde(default)]
    pub sectors: BTreeMap<String, Vec<String>>,
}

impl Universe {
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, UniverseError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn sector_symbols(&self, sector: &str) -> Option<&[String]> {
        self.sectors.get(sector).map(Vec::as_slice)
    }

    pub fn sector_names(&self) -> Vec<&str> {
        self.sectors.keys().map(String::as_str).collect()
    }
}

impl SymbolSource for Universe {
    fn list_symbols(&self, market: Market) -> Vec<String> {
        match self.markets.get(&market) {
            Some(symbols) => symbols.clone(),
            None => {
                debug!(%market, "market not in universe file, using built-in list");
                StaticSymbolSource.list_symbols(market)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn static_lists_are_populated_and_unique() {
        for market in Market::ALL {
            let symbols = StaticSymbolSource.list_symbols(market);
            assert!(!symbols.is_empty(), "{market}");
            let unique: HashSet<&String> = symbols.iter().collect();
            assert_eq!(unique.len(), symbols.len(), "{market} has duplicates");
        }
        assert_eq!(StaticSymbolSource::symbols(Market::Kospi)[0], "005930.KS");
    }

    #[test]
    fn universe_overrides_and_falls_back() {
        let u = Universe::from_toml(
            r#"
            [markets]
            KOSPI = ["005930.KS"]

            [sectors]
            chips = ["005930.KS", "000660.KS"]
            "#,
        )
        .unwrap();
        assert_eq!(u.list_symbols(Market::Kospi), vec!["005930.KS".to_string()]);
        assert_eq!(
            u.list_symbols(Market::Kosdaq),
            StaticSymbolSource.list_symbols(Market::Kosdaq)
        );
        assert_eq!(u.sector_symbols("chips").unwrap().len(), 2);
        assert_eq!(u.sector_names(), vec!["chips"]);
    }

    #[test]
    fn toml_roundtrip() {
        let mut u = Universe::default();
        u.markets.insert(Market::Nasdaq, vec!["AAPL".into()]);
        u.sectors.insert("tech".into(), vec!["AAPL".into(), "MSFT".into()]);
        let parsed = Universe::from_toml(&u.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, u);
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        assert!(matches!(
            Universe::from_toml("markets = 3"),
            Err(UniverseError::Parse(_))
        ));
    }
}
