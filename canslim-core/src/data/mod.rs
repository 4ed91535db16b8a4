//! Market data: provider seam, concrete providers and symbol universes.

pub mod circuit_breaker;
pub mod memory;
pub mod provider;
pub mod synthetic;
pub mod universe;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use memory::InMemoryProvider;
pub use provider::{
    require_history, DataError, DataSource, HistoryPeriod, MarketDataProvider, SymbolSource,
};
pub use synthetic::SyntheticProvider;
pub use universe::{StaticSymbolSource, Universe, UniverseError};
pub use yahoo::YahooProvider;
