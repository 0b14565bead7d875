//! Line-based version of the conversion form: pick a category, enter a
//! value, pick both units, see the result.

use super::{convert, ui};
use crate::core::{ConversionRequest, Converter, RateProvider, UnitCategory};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Resolves a menu answer given either as a 1-based index or as the option itself.
pub fn pick<'a>(options: &[&'a str], answer: &str) -> Option<&'a str> {
    let answer = answer.trim();
    if let Ok(index) = answer.parse::<usize>() {
        return index.checked_sub(1).and_then(|i| options.get(i)).copied();
    }
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(answer))
        .copied()
}

fn is_quit(answer: &str) -> bool {
    matches!(answer.trim(), "" | "q" | "quit" | "exit")
}

struct Form<'c, R: RateProvider, I: BufRead, O: Write> {
    converter: &'c Converter<R>,
    input: I,
    output: O,
}

impl<R: RateProvider, I: BufRead, O: Write> Form<'_, R, I, O> {
    /// Prints `prompt` and returns the next line, or `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{} ", ui::style_text(prompt, ui::StyleType::Prompt))?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;
        Ok((read > 0).then(|| line.trim().to_string()))
    }

    fn menu(&mut self, title: &str, options: &[&str]) -> Result<()> {
        writeln!(self.output, "\n{}", ui::style_text(title, ui::StyleType::Title))?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}. {}", i + 1, option)?;
        }
        Ok(())
    }

    /// Asks until the answer names one of `options`; `None` means the user quit.
    fn choose<'a>(&mut self, prompt: &str, options: &[&'a str]) -> Result<Option<&'a str>> {
        loop {
            let Some(answer) = self.ask(prompt)? else {
                return Ok(None);
            };
            if is_quit(&answer) {
                return Ok(None);
            }
            match pick(options, &answer) {
                Some(choice) => return Ok(Some(choice)),
                None => writeln!(
                    self.output,
                    "{}",
                    ui::style_text(&format!("'{answer}' is not an option"), ui::StyleType::Error)
                )?,
            }
        }
    }

    fn value(&mut self) -> Result<Option<f64>> {
        loop {
            let Some(answer) = self.ask("Enter your value:")? else {
                return Ok(None);
            };
            if is_quit(&answer) {
                return Ok(None);
            }
            match answer.parse::<f64>() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(
                    self.output,
                    "{}",
                    ui::style_text(&format!("'{answer}' is not a number"), ui::StyleType::Error)
                )?,
            }
        }
    }

    /// Runs one round of the form; `false` once the user is done.
    fn round(&mut self) -> Result<bool> {
        let names: Vec<String> = UnitCategory::ALL.iter().map(|c| c.to_string()).collect();
        let labels: Vec<&str> = names.iter().map(String::as_str).collect();
        self.menu("Categories", &labels)?;
        let Some(category) = self.choose("Choose a category:", &labels)? else {
            return Ok(false);
        };
        let category: UnitCategory = category.parse()?;

        let Some(value) = self.value()? else {
            return Ok(false);
        };

        let units = category.units();
        self.menu(&format!("{category} units"), units)?;
        let Some(from_unit) = self.choose("Convert from:", units)? else {
            return Ok(false);
        };
        let Some(to_unit) = self.choose("Convert to:", units)? else {
            return Ok(false);
        };

        let request = ConversionRequest::new(value, from_unit, to_unit);
        let outcome = self.converter.convert_request(&request);
        let style = if outcome.is_ok() {
            ui::StyleType::Result
        } else {
            ui::StyleType::Error
        };
        writeln!(
            self.output,
            "\n{}",
            ui::style_text(&convert::describe(&request, &outcome), style)
        )?;
        Ok(true)
    }
}

/// Runs the form over arbitrary input and output until the user quits.
pub fn session<R, I, O>(converter: &Converter<R>, input: I, output: O) -> Result<()>
where
    R: RateProvider,
    I: BufRead,
    O: Write,
{
    let mut form = Form {
        converter,
        input,
        output,
    };
    writeln!(
        form.output,
        "{}",
        ui::style_text(
            "Enter a value, pick your units, and see the result. Leave an answer empty or type 'q' to quit.",
            ui::StyleType::Subtle
        )
    )?;
    while form.round()? {}
    Ok(())
}

pub fn run<R: RateProvider>(converter: &Converter<R>) -> Result<()> {
    let stdin = std::io::stdin();
    session(converter, stdin.lock(), console::Term::stdout())?;
    ui::print_separator();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RateTable;
    use std::io::Cursor;

    fn run_session(script: &str) -> String {
        let converter = Converter::new(RateTable::builtin());
        let mut output = Vec::new();
        session(&converter, Cursor::new(script.to_string()), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_pick_by_index_or_name() {
        let options = ["celsius", "fahrenheit", "kelvin"];
        assert_eq!(pick(&options, "2"), Some("fahrenheit"));
        assert_eq!(pick(&options, " Kelvin "), Some("kelvin"));
        assert_eq!(pick(&options, "0"), None);
        assert_eq!(pick(&options, "4"), None);
        assert_eq!(pick(&options, "rankine"), None);
    }

    #[test]
    fn test_session_converts_temperature() {
        let output = run_session("temperature\n100\n1\n2\nq\n");
        assert!(output.contains("100 celsius is equal to 212 fahrenheit!"));
    }

    #[test]
    fn test_session_retries_invalid_answers() {
        let output = run_session("9\nlength\nabc\n1\nkilometer\nmeter\n\n");
        assert!(output.contains("'9' is not an option"));
        assert!(output.contains("'abc' is not a number"));
        assert!(output.contains("1 kilometer is equal to 1000 meter!"));
    }

    #[test]
    fn test_session_currency_and_end_of_input() {
        let output = run_session("6\n10\nUSD\nINR\n");
        assert!(output.contains("10 USD is equal to 835 INR!"));
    }

    #[test]
    fn test_session_quits_immediately() {
        let output = run_session("q\n");
        assert!(!output.contains("is equal to"));
    }
}
