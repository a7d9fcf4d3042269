//! Core business logic: prices, returns, baskets and formatting

pub mod basket;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod format;
pub mod log;
pub mod lookback;
pub mod price;
pub mod returns;
pub mod universe;

// Re-export main types for cleaner imports
pub use dashboard::Dashboard;
pub use lookback::Lookback;
pub use price::{DateRange, PriceSeries, PriceTable, QuoteSource};
pub use returns::ReturnTable;
pub use universe::{SymbolGroup, ThemeBasket, Universe};
