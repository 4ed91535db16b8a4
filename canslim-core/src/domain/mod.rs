//! Domain types: bars, price series, markets.

pub mod bar;
pub mod market;
pub mod series;

pub use bar::Bar;
pub use market::{Market, ParseMarketError};
pub use series::{aligned_closes, BenchmarkSeries, PriceSeries};

/// Symbol type alias
pub type Symbol = String;
