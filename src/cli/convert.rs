use super::ui;
use crate::core::{Conversion, ConversionError, ConversionRequest, Converter, RateProvider, Route};
use anyhow::Result;
use serde::Serialize;

/// Machine-readable result of a single conversion.
#[derive(Debug, Serialize)]
pub struct ConvertOutput<'a> {
    #[serde(flatten)]
    pub request: &'a ConversionRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> ConvertOutput<'a> {
    pub fn new(
        request: &'a ConversionRequest,
        outcome: &Result<Conversion, ConversionError>,
    ) -> Self {
        match outcome {
            Ok(conversion) => ConvertOutput {
                request,
                result: Some(conversion.value),
                route: Some(conversion.route),
                error: None,
            },
            Err(e) => ConvertOutput {
                request,
                result: None,
                route: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// The sentence shown for a conversion, or the failure message in its place.
pub fn describe(
    request: &ConversionRequest,
    outcome: &Result<Conversion, ConversionError>,
) -> String {
    match outcome {
        Ok(conversion) => format!(
            "{} {} is equal to {} {}!",
            request.value, request.from_unit, conversion.value, request.to_unit
        ),
        Err(e) => e.user_message(),
    }
}

fn styled(request: &ConversionRequest, outcome: &Result<Conversion, ConversionError>) -> String {
    let text = describe(request, outcome);
    match outcome {
        Ok(_) => ui::style_text(&text, ui::StyleType::Result),
        Err(_) => ui::style_text(&text, ui::StyleType::Error),
    }
}

/// Converts one request and prints the outcome.
///
/// Conversion failures are reported in the output, not returned as errors.
pub fn run<R: RateProvider>(
    converter: &Converter<R>,
    request: &ConversionRequest,
    json: bool,
) -> Result<()> {
    let outcome = converter.convert_request(request);

    if json {
        let output = ConvertOutput::new(request, &outcome);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", styled(request, &outcome));
    }

    Ok(())
}
