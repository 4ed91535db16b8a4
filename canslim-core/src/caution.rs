//! Basket-level caution signals.
//!
//! A basket (sector, index, watch list) is evaluated as a whole for four
//! risk conditions. Each condition runs over the symbols with enough history
//! for it; symbols without it are left out of that condition's statistics
//! rather than counted as zero.

use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;
use crate::indicators::stats::mean;
use crate::signals::high_52w::{self, High52w};
use crate::signals::{SignalError, SignalResult};

pub const THREE_MONTHS: usize = 63;
pub const SIX_MONTHS: usize = 126;
pub const ONE_YEAR: usize = 252;

/// Number of implemented warnings; the largest possible caution score.
pub const WARNING_COUNT: u8 = 4;

/// Score at or above which a basket is flagged as high caution.
///
/// Kept at 5 although only four warnings exist, so the flag never fires
/// unless a caller lowers it explicitly.
pub const DEFAULT_HIGH_CAUTION_THRESHOLD: u8 = 5;

/// Bottom-quartile 6-month return, in percent, that counts as a laggard surge.
pub const LAGGARD_SURGE_PCT: f64 = 50.0;
pub const HIGH_VALUATION_PRICE_RATIO: f64 = 0.9;
pub const HIGH_VALUATION_SHARE: f64 = 0.5;
pub const EXTREME_GAIN_PCT: f64 = 1000.0;
pub const HEAT_3M_PCT: f64 = 30.0;
pub const HEAT_6M_PCT: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaggardSurge {
    pub avg_laggard_return_6m: f64,
    pub laggard_count: usize,
    pub warning: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighValuation {
    pub high_valuation_count: usize,
    pub total_analyzed: usize,
    pub high_valuation_ratio: f64,
    pub warning: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverageRisk {
    pub extreme_gain_count: usize,
    pub total_analyzed: usize,
    pub leverage_risk_ratio: f64,
    pub warning: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketHeat {
    pub avg_return_3m: f64,
    pub avg_return_6m: f64,
    pub overheated_3m: bool,
    pub overheated_6m: bool,
    pub warning: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CautionResult {
    pub sector: Option<String>,
    /// Symbols requested.
    pub symbol_count: usize,
    /// Symbols whose history was available and evaluated.
    pub evaluated_symbols: Vec<String>,
    /// Symbols skipped because no history could be loaded.
    pub unavailable_symbols: Vec<String>,
    pub laggard_surge: SignalResult<LaggardSurge>,
    pub high_valuation: SignalResult<HighValuation>,
    pub leverage_risk: SignalResult<LeverageRisk>,
    pub market_heat: SignalResult<MarketHeat>,
    pub caution_score: u8,
    pub high_caution: bool,
}

impl CautionResult {
    pub fn laggard_surge_warning(&self) -> bool {
        self.laggard_surge.as_ref().is_ok_and(|d| d.warning)
    }

    pub fn high_valuation_warning(&self) -> bool {
        self.high_valuation.as_ref().is_ok_and(|d| d.warning)
    }

    pub fn leverage_risk_warning(&self) -> bool {
        self.leverage_risk.as_ref().is_ok_and(|d| d.warning)
    }

    pub fn market_heat_warning(&self) -> bool {
        self.market_heat.as_ref().is_ok_and(|d| d.warning)
    }

    pub fn warnings(&self) -> [bool; WARNING_COUNT as usize] {
        [
            self.laggard_surge_warning(),
            self.high_valuation_warning(),
            self.leverage_risk_warning(),
            self.market_heat_warning(),
        ]
    }
}

/// Evaluates caution over baskets of price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CautionEvaluator {
    pub high_caution_threshold: u8,
}

impl Default for CautionEvaluator {
    fn default() -> Self {
        Self {
            high_caution_threshold: DEFAULT_HIGH_CAUTION_THRESHOLD,
        }
    }
}

impl CautionEvaluator {
    pub fn new(high_caution_threshold: u8) -> Self {
        Self {
            high_caution_threshold,
        }
    }

    /// Evaluate a basket. `unavailable` lists requested symbols that had no
    /// data and were skipped by the caller.
    pub fn evaluate(
        &self,
        sector: Option<&str>,
        basket: &[PriceSeries],
        unavailable: Vec<String>,
    ) -> CautionResult {
        let laggard_surge = laggard_surge(basket);
        let high_valuation = high_valuation(basket);
        let leverage_risk = leverage_risk(basket);
        let market_heat = market_heat(basket);

        let mut result = CautionResult {
            sector: sector.map(str::to_string),
            symbol_count: basket.len() + unavailable.len(),
            evaluated_symbols: basket.iter().map(|s| s.symbol().to_string()).collect(),
            unavailable_symbols: unavailable,
            laggard_surge,
            high_valuation,
            leverage_risk,
            market_heat,
            caution_score: 0,
            high_caution: false,
        };
        result.caution_score = result.warnings().iter().filter(|&&w| w).count() as u8;
        result.high_caution = result.caution_score >= self.high_caution_threshold;
        result
    }
}

fn insufficient(required: usize, basket: &[PriceSeries]) -> SignalError {
    SignalError::InsufficientHistory {
        required,
        available: basket.iter().map(PriceSeries::len).max().unwrap_or(0),
    }
}

fn non_finite(what: &str) -> SignalError {
    SignalError::Computation(format!("{what} is not finite"))
}

/// Mean 6-month return of the bottom quartile (at least one symbol).
pub fn laggard_surge(basket: &[PriceSeries]) -> SignalResult<LaggardSurge> {
    let mut returns: Vec<f64> = basket
        .iter()
        .filter_map(|s| s.return_over(SIX_MONTHS))
        .collect();
    if returns.is_empty() {
        return Err(insufficient(SIX_MONTHS, basket));
    }

    returns.sort_by(|a, b| a.total_cmp(b));
    let laggard_count = (returns.len() / 4).max(1);
    let avg = mean(&returns[..laggard_count]).ok_or_else(|| non_finite("laggard average"))?;

    Ok(LaggardSurge {
        avg_laggard_return_6m: avg,
        laggard_count,
        warning: avg >= LAGGARD_SURGE_PCT,
    })
}

/// Share of 6-month-eligible symbols trading within 10% of their 52-week high.
///
/// A symbol without a full year of highs is counted in the denominator but
/// never as high.
pub fn high_valuation(basket: &[PriceSeries]) -> SignalResult<HighValuation> {
    let eligible: Vec<&PriceSeries> = basket.iter().filter(|s| s.len() >= SIX_MONTHS).collect();
    if eligible.is_empty() {
        return Err(insufficient(SIX_MONTHS, basket));
    }

    let high_valuation_count = eligible
        .iter()
        .filter(|s| {
            high_52w::high_52w(s).is_ok_and(|h: High52w| {
                h.full_window() && h.current_price / h.high_52w >= HIGH_VALUATION_PRICE_RATIO
            })
        })
        .count();

    let ratio = high_valuation_count as f64 / eligible.len() as f64;
    Ok(HighValuation {
        high_valuation_count,
        total_analyzed: eligible.len(),
        high_valuation_ratio: ratio,
        warning: ratio >= HIGH_VALUATION_SHARE,
    })
}

/// Any 1-year return of 1000% or more.
pub fn leverage_risk(basket: &[PriceSeries]) -> SignalResult<LeverageRisk> {
    let returns: Vec<f64> = basket
        .iter()
        .filter_map(|s| s.return_over(ONE_YEAR))
        .collect();
    if returns.is_empty() {
        return Err(insufficient(ONE_YEAR, basket));
    }

    let extreme_gain_count = returns.iter().filter(|&&r| r >= EXTREME_GAIN_PCT).count();
    Ok(LeverageRisk {
        extreme_gain_count,
        total_analyzed: returns.len(),
        leverage_risk_ratio: extreme_gain_count as f64 / returns.len() as f64,
        warning: extreme_gain_count > 0,
    })
}

/// Basket-average 3- and 6-month returns over the 6-month-eligible symbols.
pub fn market_heat(basket: &[PriceSeries]) -> SignalResult<MarketHeat> {
    let mut returns_3m = Vec::new();
    let mut returns_6m = Vec::new();
    for series in basket.iter().filter(|s| s.len() >= SIX_MONTHS) {
        if let (Some(r3), Some(r6)) = (series.return_over(THREE_MONTHS), series.return_over(SIX_MONTHS)) {
            returns_3m.push(r3);
            returns_6m.push(r6);
        }
    }
    if returns_6m.is_empty() {
        return Err(insufficient(SIX_MONTHS, basket));
    }

    let avg_return_3m = mean(&returns_3m).ok_or_else(|| non_finite("3-month average"))?;
    let avg_return_6m = mean(&returns_6m).ok_or_else(|| non_finite("6-month average"))?;
    let overheated_3m = avg_return_3m >= HEAT_3M_PCT;
    let overheated_6m = avg_return_6m >= HEAT_6M_PCT;
    Ok(MarketHeat {
        avg_return_3m,
        avg_return_6m,
        overheated_3m,
        overheated_6m,
        warning: overheated_3m || overheated_6m,
    })
}
