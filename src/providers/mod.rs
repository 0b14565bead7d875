pub mod util;
pub mod yahoo;

pub use yahoo::YahooCurrencyProvider;
