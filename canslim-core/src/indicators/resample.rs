//! Calendar resampling of daily bars.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// One calendar month aggregated from daily bars.
///
/// `date` is the last calendar day of the month, so a partially elapsed
/// month is labelled the same way as a complete one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Resample chronologically ascending daily bars into calendar months.
///
/// Open is the month's first open, High the max, Low the min, Close the last
/// close, Volume the sum. Months without bars are not emitted.
pub fn monthly_bars(bars: &[Bar]) -> Vec<MonthlyBar> {
    let mut months: Vec<MonthlyBar> = Vec::new();
    let mut current_key: Option<(i32, u32)> = None;

    for bar in bars {
        let key = (bar.date.year(), bar.date.month());
        if current_key == Some(key) {
            if let Some(m) = months.last_mut() {
                m.high = m.high.max(bar.high);
                m.low = m.low.min(bar.low);
                m.close = bar.close;
                m.volume = m.volume.saturating_add(bar.volume);
            }
            continue;
        }

        current_key = Some(key);
        months.push(MonthlyBar {
            date: month_end(key.0, key.1).unwrap_or(bar.date),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        });
    }

    months
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()
}
