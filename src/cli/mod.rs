pub mod convert;
pub mod interactive;
pub mod rates;
pub mod setup;
pub mod ui;
pub mod units;
