//! Combined single-symbol report: leadership, optional sector caution and
//! the resulting recommendation.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::session::{AnalyzerSession, LeadershipEvaluation};
use crate::caution::CautionResult;
use crate::recommendation::{self, Recommendation};

/// Never an error: failures are carried in the `*_error` fields so callers
/// can render a partial report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub generated_at: NaiveDateTime,
    pub benchmark_symbol: String,
    pub leadership: Option<LeadershipEvaluation>,
    pub leadership_error: Option<String>,
    pub caution: Option<CautionResult>,
    pub caution_error: Option<String>,
    pub recommendation: Recommendation,
}

impl AnalysisReport {
    pub fn is_complete(&self) -> bool {
        self.leadership_error.is_none() && self.caution_error.is_none()
    }
}

impl AnalyzerSession {
    /// Analyse `symbol` and, when `sector_symbols` is given, the caution
    /// state of that basket, then recommend.
    ///
    /// A failed caution evaluation contributes a caution score of 0.
    ///
    /// A failed leadership evaluation (the provider had no usable history for
    /// `symbol`) yields `Action::Unavailable` with confidence 0 instead of
    /// scoring the symbol as 0/6. A symbol that could not be loaded is not
    /// a weak leader, so it is never reported as "hold off". The basket's
    /// caution result is still attached to the report.
    pub fn generate_report(&self, symbol: &str, sector_symbols: Option<&[String]>) -> AnalysisReport {
        let (leadership, leadership_error) = match self.evaluate_leadership(symbol) {
            Ok(eval) => (Some(eval), None),
            Err(e) => {
                warn!(%symbol, error = %e, "leadership evaluation failed");
                (None, Some(e.to_string()))
            }
        };

        let (caution, caution_error) = match sector_symbols {
            Some(symbols) => match self.evaluate_caution(symbols, None) {
                Ok(result) => (Some(result), None),
                Err(e) => {
                    warn!(%symbol, error = %e, "caution evaluation failed");
                    (None, Some(e.to_string()))
                }
            },
            None => (None, None),
        };

        let recommendation = match (&leadership, &leadership_error) {
            (Some(eval), _) => recommendation::recommend(
                eval.leadership.raw_score,
                caution.as_ref().map_or(0, |c| c.caution_score),
            ),
            (None, Some(reason)) => recommendation::unavailable(reason.clone()),
            (None, None) => recommendation::unavailable("no leadership evaluation"),
        };

        AnalysisReport {
            symbol: symbol.to_string(),
            generated_at: Local::now().naive_local(),
            benchmark_symbol: self.benchmark_symbol().to_string(),
            leadership,
            leadership_error,
            caution,
            caution_error,
            recommendation,
        }
    }
}
