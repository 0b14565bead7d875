//! Conversion logic and its supporting abstractions

pub mod cache;
pub mod catalog;
pub mod config;
pub mod converter;
pub mod currency;
pub mod error;
pub mod log;
pub mod rates;
pub mod units;

// Re-export main types for cleaner imports
pub use catalog::UnitCategory;
pub use converter::{Conversion, ConversionRequest, Converter, Route, convert};
pub use currency::CurrencyRateProvider;
pub use error::ConversionError;
pub use rates::{RateProvider, RateTable};
