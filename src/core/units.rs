//! Physical units registry
//!
//! Parses unit identifiers such as `kilometer`, `km`, `cubic meter` or
//! `meter/second`, tracks their dimensionality and converts quantities
//! between compatible units, including affine temperature scales.

use crate::core::error::ConversionError;
use std::fmt::{self, Display};
use tracing::debug;

/// Exponents over the base dimensions the registry understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimension {
    pub length: i8,
    pub mass: i8,
    pub time: i8,
    pub temperature: i8,
}

impl Dimension {
    pub const NONE: Dimension = Dimension::new(0, 0, 0, 0);
    pub const LENGTH: Dimension = Dimension::new(1, 0, 0, 0);
    pub const AREA: Dimension = Dimension::new(2, 0, 0, 0);
    pub const VOLUME: Dimension = Dimension::new(3, 0, 0, 0);
    pub const MASS: Dimension = Dimension::new(0, 1, 0, 0);
    pub const TIME: Dimension = Dimension::new(0, 0, 1, 0);
    pub const TEMPERATURE: Dimension = Dimension::new(0, 0, 0, 1);

    pub const fn new(length: i8, mass: i8, time: i8, temperature: i8) -> Self {
        Dimension {
            length,
            mass,
            time,
            temperature,
        }
    }

    /// Raises every exponent by `n`, or `None` when one leaves the `i8` range.
    pub fn checked_powi(self, n: i8) -> Option<Self> {
        Some(Dimension {
            length: self.length.checked_mul(n)?,
            mass: self.mass.checked_mul(n)?,
            time: self.time.checked_mul(n)?,
            temperature: self.temperature.checked_mul(n)?,
        })
    }

    /// Dimension of a product of two quantities.
    pub fn checked_mul(self, rhs: Dimension) -> Option<Self> {
        Some(Dimension {
            length: self.length.checked_add(rhs.length)?,
            mass: self.mass.checked_add(rhs.mass)?,
            time: self.time.checked_add(rhs.time)?,
            temperature: self.temperature.checked_add(rhs.temperature)?,
        })
    }

    fn terms(&self) -> [(&'static str, i8); 4] {
        [
            ("[length]", self.length),
            ("[mass]", self.mass),
            ("[time]", self.time),
            ("[temperature]", self.temperature),
        ]
    }
}

fn format_term(name: &str, exponent: i32) -> String {
    if exponent == 1 {
        name.to_string()
    } else {
        format!("{name} ** {exponent}")
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Dimension::NONE {
            return write!(f, "dimensionless");
        }

        let numerator: Vec<String> = self
            .terms()
            .iter()
            .filter(|(_, exp)| *exp > 0)
            .map(|(name, exp)| format_term(name, i32::from(*exp)))
            .collect();
        let denominator: Vec<String> = self
            .terms()
            .iter()
            .filter(|(_, exp)| *exp < 0)
            .map(|(name, exp)| format_term(name, -i32::from(*exp)))
            .collect();

        let top = if numerator.is_empty() {
            "1".to_string()
        } else {
            numerator.join(" * ")
        };

        if denominator.is_empty() {
            write!(f, "{top}")
        } else {
            write!(f, "{top} / {}", denominator.join(" / "))
        }
    }
}

/// A named unit known to the registry.
#[derive(Debug, Clone, Copy)]
struct UnitDef {
    name: &'static str,
    symbols: &'static [&'static str],
    aliases: &'static [&'static str],
    /// Multiplier to the SI base unit of the dimension
    factor: f64,
    /// Added after scaling; non-zero only for offset temperature scales
    offset: f64,
    dimension: Dimension,
    prefixable: bool,
}

const fn unit(
    name: &'static str,
    symbols: &'static [&'static str],
    aliases: &'static [&'static str],
    factor: f64,
    dimension: Dimension,
    prefixable: bool,
) -> UnitDef {
    UnitDef {
        name,
        symbols,
        aliases,
        factor,
        offset: 0.0,
        dimension,
        prefixable,
    }
}

const FAHRENHEIT_FACTOR: f64 = 5.0 / 9.0;

static UNITS: &[UnitDef] = &[
    // Length (base: meter)
    unit("meter", &["m"], &["metre"], 1.0, Dimension::LENGTH, true),
    unit("inch", &["in"], &["inches"], 0.0254, Dimension::LENGTH, false),
    unit("foot", &["ft"], &["feet"], 0.3048, Dimension::LENGTH, false),
    unit("yard", &["yd"], &[], 0.9144, Dimension::LENGTH, false),
    unit("mile", &["mi"], &[], 1609.344, Dimension::LENGTH, false),
    unit("nautical_mile", &["nmi"], &[], 1852.0, Dimension::LENGTH, false),
    // Mass (base: kilogram)
    unit("gram", &["g"], &["gramme"], 1e-3, Dimension::MASS, true),
    unit("tonne", &["t"], &["metric_ton"], 1e3, Dimension::MASS, false),
    unit("pound", &["lb"], &["lbs"], 0.45359237, Dimension::MASS, false),
    unit("ounce", &["oz"], &[], 0.028349523125, Dimension::MASS, false),
    unit("stone", &["st"], &[], 6.35029318, Dimension::MASS, false),
    // Time (base: second)
    unit("second", &["s", "sec"], &[], 1.0, Dimension::TIME, true),
    unit("minute", &["min"], &[], 60.0, Dimension::TIME, false),
    unit("hour", &["h", "hr"], &[], 3600.0, Dimension::TIME, false),
    unit("day", &["d"], &[], 86400.0, Dimension::TIME, false),
    unit("week", &[], &[], 604800.0, Dimension::TIME, false),
    unit("year", &["yr"], &[], 31557600.0, Dimension::TIME, false),
    // Volume (base: cubic meter)
    unit("liter", &["l", "L"], &["litre"], 1e-3, Dimension::VOLUME, true),
    unit("gallon", &["gal"], &[], 3.785411784e-3, Dimension::VOLUME, false),
    unit("quart", &["qt"], &[], 9.46352946e-4, Dimension::VOLUME, false),
    unit("pint", &["pt"], &[], 4.73176473e-4, Dimension::VOLUME, false),
    unit("cup", &[], &[], 2.365882365e-4, Dimension::VOLUME, false),
    unit(
        "fluid_ounce",
        &["floz"],
        &[],
        2.95735295625e-5,
        Dimension::VOLUME,
        false,
    ),
    // Temperature (base: kelvin)
    unit("kelvin", &["K"], &["degK"], 1.0, Dimension::TEMPERATURE, false),
    UnitDef {
        name: "celsius",
        symbols: &["degC"],
        aliases: &["degree_Celsius"],
        factor: 1.0,
        offset: 273.15,
        dimension: Dimension::TEMPERATURE,
        prefixable: false,
    },
    UnitDef {
        name: "fahrenheit",
        symbols: &["degF"],
        aliases: &["degree_Fahrenheit"],
        factor: FAHRENHEIT_FACTOR,
        offset: 459.67 * FAHRENHEIT_FACTOR,
        dimension: Dimension::TEMPERATURE,
        prefixable: false,
    },
    unit(
        "rankine",
        &["degR"],
        &["degree_Rankine"],
        FAHRENHEIT_FACTOR,
        Dimension::TEMPERATURE,
        false,
    ),
];

/// SI prefixes as (word, symbol, multiplier).
static PREFIXES: &[(&str, &str, f64)] = &[
    ("tera", "T", 1e12),
    ("giga", "G", 1e9),
    ("mega", "M", 1e6),
    ("kilo", "k", 1e3),
    ("hecto", "h", 1e2),
    ("deca", "da", 1e1),
    ("deci", "d", 1e-1),
    ("centi", "c", 1e-2),
    ("milli", "m", 1e-3),
    ("micro", "µ", 1e-6),
    ("micro", "u", 1e-6),
    ("nano", "n", 1e-9),
    ("pico", "p", 1e-12),
];

/// A parsed unit expression, reduced to SI base units.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitExpr {
    label: String,
    factor: f64,
    offset: f64,
    dimension: Dimension,
}

impl UnitExpr {
    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    fn to_base(&self, magnitude: f64) -> f64 {
        magnitude * self.factor + self.offset
    }

    fn from_base(&self, base: f64) -> f64 {
        (base - self.offset) / self.factor
    }
}

/// A magnitude tagged with the unit it is expressed in.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    magnitude: f64,
    unit: UnitExpr,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: UnitExpr) -> Self {
        Quantity { magnitude, unit }
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Expresses this quantity in `target`, which must share its dimension.
    pub fn to(&self, target: &UnitExpr) -> Result<Quantity, ConversionError> {
        if self.unit.dimension != target.dimension {
            return Err(ConversionError::IncompatibleUnits {
                from: self.unit.label.clone(),
                from_dim: self.unit.dimension.to_string(),
                to: target.label.clone(),
                to_dim: target.dimension.to_string(),
            });
        }

        let magnitude = if self.unit == *target {
            self.magnitude
        } else {
            target.from_base(self.unit.to_base(self.magnitude))
        };

        Ok(Quantity {
            magnitude,
            unit: target.clone(),
        })
    }
}

/// Read-only registry of unit definitions and SI prefixes.
#[derive(Debug, Clone, Copy)]
pub struct UnitRegistry {
    units: &'static [UnitDef],
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRegistry {
    pub fn new() -> Self {
        UnitRegistry { units: UNITS }
    }

    /// Builds a quantity of `magnitude` in the unit described by `expr`.
    pub fn quantity(&self, magnitude: f64, expr: &str) -> Result<Quantity, ConversionError> {
        Ok(Quantity::new(magnitude, self.parse(expr)?))
    }

    /// Parses a unit expression such as `km`, `cubic meter`, `m/s` or `meter**2`.
    pub fn parse(&self, expr: &str) -> Result<UnitExpr, ConversionError> {
        let label = expr.trim();
        if label.is_empty() {
            return Err(ConversionError::MalformedInput(
                "empty unit expression".to_string(),
            ));
        }

        let normalized = label.replace("**", "^").replace(" per ", "/");

        let mut terms = Vec::new();
        let mut divide = false;
        let mut current = String::new();
        for ch in normalized.chars() {
            match ch {
                '*' | '/' => {
                    terms.push((std::mem::take(&mut current), divide));
                    divide = ch == '/';
                }
                _ => current.push(ch),
            }
        }
        terms.push((current, divide));

        let compound = terms.len() > 1;
        let mut factor = 1.0;
        let mut dimension = Dimension::NONE;
        let mut offset = 0.0;

        for (term, divide) in &terms {
            let (def, term_factor, power) = self.parse_term(term)?;

            if def.offset != 0.0 && (compound || power != 1) {
                return Err(ConversionError::MalformedInput(format!(
                    "ambiguous operation with offset unit '{}'",
                    def.name
                )));
            }

            let exponent = if *divide {
                power.checked_neg().ok_or_else(exponent_out_of_range)?
            } else {
                power
            };
            factor *= term_factor.powi(i32::from(exponent));
            dimension = def
                .dimension
                .checked_powi(exponent)
                .and_then(|d| dimension.checked_mul(d))
                .ok_or_else(exponent_out_of_range)?;
            offset = def.offset;
        }

        debug!(unit = label, factor, %dimension, "Parsed unit expression");

        Ok(UnitExpr {
            label: label.to_string(),
            factor,
            offset,
            dimension,
        })
    }

    fn parse_term(&self, term: &str) -> Result<(UnitDef, f64, i8), ConversionError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ConversionError::MalformedInput(
                "missing unit in expression".to_string(),
            ));
        }

        let (body, mut power) = match term.split_once('^') {
            Some((body, exp)) => {
                let exp = exp.trim();
                let power = exp.parse::<i32>().map_err(|_| {
                    ConversionError::MalformedInput(format!("invalid exponent '{exp}'"))
                })?;
                let power = i8::try_from(power).map_err(|_| exponent_out_of_range())?;
                (body.trim(), power)
            }
            None => (term, 1),
        };

        let mut words: Vec<&str> = body.split_whitespace().collect();
        let scale = match words.first() {
            Some(&"square") if words.len() > 1 => 2,
            Some(&"cubic") if words.len() > 1 => 3,
            _ => 1,
        };
        if scale > 1 {
            power = power.checked_mul(scale).ok_or_else(exponent_out_of_range)?;
            words.remove(0);
        }
        let name = words.join("_");

        let (def, factor) = self
            .resolve(&name)
            .ok_or_else(|| ConversionError::UnknownUnit(name.clone()))?;
        Ok((def, factor, power))
    }

    /// Looks up a single unit name, trying plurals and SI prefixes.
    fn resolve(&self, name: &str) -> Option<(UnitDef, f64)> {
        if let Some(def) = self.find_exact(name).or_else(|| self.find_plural(name)) {
            return Some((def, def.factor));
        }

        for (word, _, multiplier) in PREFIXES {
            if let Some(rest) = name.strip_prefix(word)
                && let Some(def) = self.find_named(rest).or_else(|| self.find_plural(rest))
                && def.prefixable
            {
                return Some((def, multiplier * def.factor));
            }
        }

        // Two-letter symbols first so "da" wins over "d"
        let mut by_symbol: Vec<_> = PREFIXES.iter().collect();
        by_symbol.sort_by_key(|(_, symbol, _)| std::cmp::Reverse(symbol.len()));
        for (_, symbol, multiplier) in by_symbol {
            if let Some(rest) = name.strip_prefix(symbol)
                && let Some(def) = self.find_symbol(rest)
                && def.prefixable
            {
                return Some((def, multiplier * def.factor));
            }
        }

        None
    }

    fn find_exact(&self, name: &str) -> Option<UnitDef> {
        self.find_named(name).or_else(|| self.find_symbol(name))
    }

    fn find_named(&self, name: &str) -> Option<UnitDef> {
        self.units
            .iter()
            .find(|u| u.name == name || u.aliases.contains(&name))
            .copied()
    }

    fn find_symbol(&self, symbol: &str) -> Option<UnitDef> {
        self.units
            .iter()
            .find(|u| u.symbols.contains(&symbol))
            .copied()
    }

    fn find_plural(&self, name: &str) -> Option<UnitDef> {
        if name.len() <= 2 {
            return None;
        }
        name.strip_suffix("es")
            .and_then(|stem| self.find_named(stem))
            .or_else(|| name.strip_suffix('s').and_then(|stem| self.find_named(stem)))
    }
}

fn exponent_out_of_range() -> ConversionError {
    ConversionError::MalformedInput("exponent out of range".to_string())
}

/// The three temperature scales the converter routes explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureScale {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureScale {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "celsius" => Some(TemperatureScale::Celsius),
            "fahrenheit" => Some(TemperatureScale::Fahrenheit),
            "kelvin" => Some(TemperatureScale::Kelvin),
            _ => None,
        }
    }

    fn to_celsius(self, value: f64) -> f64 {
        match self {
            TemperatureScale::Celsius => value,
            TemperatureScale::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            TemperatureScale::Kelvin => value - 273.15,
        }
    }

    fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            TemperatureScale::Celsius => celsius,
            TemperatureScale::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
            TemperatureScale::Kelvin => celsius + 273.15,
        }
    }

    /// Converts `value` on this scale to `target`, pivoting through Celsius.
    pub fn convert(self, value: f64, target: TemperatureScale) -> f64 {
        if self == target {
            return value;
        }
        target.from_celsius(self.to_celsius(value))
    }
}
