//! Converts a value between two unit identifiers
//!
//! Resolution order:
//! 1. a currency pair the rate provider knows, rounded to two decimals
//! 2. two of `celsius`, `fahrenheit`, `kelvin`
//! 3. any dimensionally compatible pair the unit registry can parse

use crate::core::error::ConversionError;
use crate::core::rates::{RateProvider, RateTable};
use crate::core::units::{TemperatureScale, UnitRegistry};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One value to convert, as the form collects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub value: f64,
    pub from_unit: String,
    pub to_unit: String,
}

impl ConversionRequest {
    pub fn new(value: f64, from_unit: &str, to_unit: &str) -> Self {
        ConversionRequest {
            value,
            from_unit: from_unit.to_string(),
            to_unit: to_unit.to_string(),
        }
    }
}

/// Which resolution step produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Currency { rate: f64 },
    Temperature,
    Dimensional,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Conversion {
    pub value: f64,
    pub route: Route,
}

pub struct Converter<R: RateProvider> {
    rates: R,
    registry: UnitRegistry,
}

impl Default for Converter<RateTable> {
    fn default() -> Self {
        Converter::new(RateTable::builtin())
    }
}

impl<R: RateProvider> Converter<R> {
    pub fn new(rates: R) -> Self {
        Converter {
            rates,
            registry: UnitRegistry::new(),
        }
    }

    /// Converts `value` from `from_unit` to `to_unit`.
    pub fn convert(
        &self,
        value: f64,
        from_unit: &str,
        to_unit: &str,
    ) -> Result<Conversion, ConversionError> {
        if !value.is_finite() {
            return Err(ConversionError::MalformedInput(format!(
                "value must be a finite number, got {value}"
            )));
        }

        if let Some(rate) = self.rates.rate(from_unit, to_unit) {
            debug!(from_unit, to_unit, rate, "Converting with currency rate");
            return Ok(Conversion {
                value: round_to_cents(value * rate),
                route: Route::Currency { rate },
            });
        }

        if let (Some(from), Some(to)) = (
            TemperatureScale::from_name(from_unit),
            TemperatureScale::from_name(to_unit),
        ) {
            debug!(from_unit, to_unit, "Converting between temperature scales");
            return Ok(Conversion {
                value: from.convert(value, to),
                route: Route::Temperature,
            });
        }

        debug!(from_unit, to_unit, "Converting through unit registry");
        let source = self.registry.quantity(value, from_unit)?;
        let quantity = source.to(&self.registry.parse(to_unit)?)?;
        Ok(Conversion {
            value: quantity.magnitude(),
            route: Route::Dimensional,
        })
    }

    pub fn convert_request(
        &self,
        request: &ConversionRequest,
    ) -> Result<Conversion, ConversionError> {
        self.convert(request.value, &request.from_unit, &request.to_unit)
    }
}

/// Converts with the built-in currency table.
pub fn convert(value: f64, from_unit: &str, to_unit: &str) -> Result<f64, ConversionError> {
    Converter::<RateTable>::default()
        .convert(value, from_unit, to_unit)
        .map(|c| c.value)
}

/// Rounds the exact binary value to two decimal places, ties to even.
///
/// Scaling by 100 first would round products such as `1.5 * 0.91`
/// (stored as 1.36499999...) up to the next cent.
pub fn round_to_cents(value: f64) -> f64 {
    // Magnitudes beyond Decimal's range carry no fractional cents
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_every_builtin_currency_pair_uses_its_rate() {
        let table = RateTable::builtin();
        for (from, targets) in table.rates() {
            for (to, rate) in targets {
                let result = Converter::<RateTable>::default()
                    .convert(12.0, from, to)
                    .unwrap();
                assert_eq!(result.route, Route::Currency { rate: *rate }, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_currency_examples() {
        assert_eq!(convert(10.0, "USD", "PKR").unwrap(), 2780.0);
        assert_eq!(convert(100.0, "GBP", "EUR").unwrap(), 116.0);
        assert_eq!(convert(3.0, "INR", "USD").unwrap(), 0.04);
        assert_eq!(convert(-3.0, "EUR", "GBP").unwrap(), -2.58);
        assert_eq!(convert(1234.56, "USD", "INR").unwrap(), 103085.76);
    }

    #[test]
    fn test_currency_rounds_the_stored_product() {
        // Each product is stored just below the half cent
        assert_eq!(convert(1.5, "USD", "EUR").unwrap(), 1.36);
        assert_eq!(convert(2.5, "USD", "EUR").unwrap(), 2.27);
        assert_eq!(convert(5.5, "USD", "EUR").unwrap(), 5.0);
    }

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(0.0), 0.0);
        assert_eq!(round_to_cents(2.345678), 2.35);
        assert_eq!(round_to_cents(-2.345678), -2.35);
        // Exact binary ties go to the even cent
        assert_eq!(round_to_cents(0.125), 0.12);
        assert_eq!(round_to_cents(0.375), 0.38);
        assert_eq!(round_to_cents(1e30), 1e30);
    }

    #[test]
    fn test_same_currency_is_not_a_rate() {
        // No table entry for the pair, so the registry reports the unit
        let err = convert(7.0, "EUR", "EUR").unwrap_err();
        assert_eq!(err, ConversionError::UnknownUnit("EUR".to_string()));
    }

    #[test]
    fn test_currency_round_trip_is_approximate() {
        // Rates are authored independently so USD -> EUR -> USD drifts
        let there = convert(100.0, "USD", "EUR").unwrap();
        let back = convert(there, "EUR", "USD").unwrap();
        assert!((back - 100.0).abs() < 1.0, "drifted too far: {back}");
    }

    #[test]
    fn test_unknown_currency_target_is_an_error() {
        let err = convert(5.0, "USD", "XYZ").unwrap_err();
        assert_eq!(err, ConversionError::UnknownUnit("USD".to_string()));
        assert!(err.user_message().starts_with("Oops! Something went wrong: "));
    }

    #[test]
    fn test_temperature_identity_and_fixed_points() {
        for v in [-40.0, 0.0, 36.6, 1e6] {
            assert_eq!(convert(v, "celsius", "celsius").unwrap(), v);
        }
        assert_eq!(convert(0.0, "celsius", "fahrenheit").unwrap(), 32.0);
        assert_eq!(convert(100.0, "celsius", "fahrenheit").unwrap(), 212.0);
        assert_eq!(convert(-40.0, "fahrenheit", "celsius").unwrap(), -40.0);
        assert_eq!(convert(0.0, "celsius", "kelvin").unwrap(), 273.15);
    }

    #[test]
    fn test_temperature_route_matches_registry() {
        let converter = Converter::<RateTable>::default();
        let registry = UnitRegistry::new();
        for (from, to) in [
            ("celsius", "fahrenheit"),
            ("fahrenheit", "kelvin"),
            ("kelvin", "celsius"),
        ] {
            let routed = converter.convert(25.0, from, to).unwrap();
            assert_eq!(routed.route, Route::Temperature);

            let target = registry.parse(to).unwrap();
            let generic = registry.quantity(25.0, from).unwrap().to(&target).unwrap();
            assert!((routed.value - generic.magnitude()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_dimensional_conversions() {
        let km = convert(1.0, "kilometer", "mile").unwrap();
        assert!((km - 0.621371).abs() < 1e-6);

        let converter = Converter::<RateTable>::default();
        let result = converter.convert(2.0, "gallon", "liter").unwrap();
        assert_eq!(result.route, Route::Dimensional);
        assert!((result.value - 7.570823568).abs() < 1e-9);

        // Aliases outside the temperature set go through the registry
        let result = converter.convert(100.0, "degC", "degF").unwrap();
        assert_eq!(result.route, Route::Dimensional);
        assert!((result.value - 212.0).abs() < 1e-9);
    }

    #[test]
    fn test_incompatible_units_error() {
        let err = convert(1.0, "meter", "kilogram").unwrap_err();
        assert!(matches!(err, ConversionError::IncompatibleUnits { .. }));
        assert!(!err.to_string().is_empty());
        assert!(err.to_string().contains("[length]"));
    }

    #[test]
    fn test_non_finite_value_is_malformed() {
        assert!(matches!(
            convert(f64::NAN, "meter", "foot"),
            Err(ConversionError::MalformedInput(_))
        ));
        assert!(matches!(
            convert(f64::INFINITY, "USD", "EUR"),
            Err(ConversionError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_injected_rate_provider() {
        let mut rates = BTreeMap::new();
        rates.insert(
            "BTC".to_string(),
            BTreeMap::from([("USD".to_string(), 60000.0)]),
        );
        let converter = Converter::new(RateTable::new(rates));

        let result = converter.convert(0.5, "BTC", "USD").unwrap();
        assert_eq!(result.value, 30000.0);
        assert_eq!(result.route, Route::Currency { rate: 60000.0 });

        // Built-in currencies are gone with a custom provider
        assert!(converter.convert(1.0, "USD", "EUR").is_err());
    }

    #[test]
    fn test_convert_request() {
        let converter = Converter::<RateTable>::default();
        let request = ConversionRequest::new(3.0, "foot", "inch");
        let result = converter.convert_request(&request).unwrap();
        assert!((result.value - 36.0).abs() < 1e-9);
    }
}
