pub mod caching;
pub mod util;
pub mod yahoo_finance;

pub use caching::CachingQuoteSource;
pub use yahoo_finance::YahooQuoteSource;
