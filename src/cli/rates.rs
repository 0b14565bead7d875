use super::ui;
use crate::core::{RateProvider, RateTable};
use comfy_table::{Cell, Table};

/// Rate matrix with one row per source currency.
pub fn rates_table(rates: &RateTable) -> Table {
    let currencies = rates.currencies();
    let targets: Vec<&String> = {
        let mut all: Vec<&String> = rates.rates().values().flat_map(|t| t.keys()).collect();
        all.extend(currencies.iter());
        all.sort();
        all.dedup();
        all
    };

    let mut table = ui::new_styled_table();
    let mut header = vec![ui::header_cell("From \\ To")];
    header.extend(targets.iter().map(|t| ui::header_cell(t)));
    table.set_header(header);

    for from in &currencies {
        let mut row = vec![Cell::new(from)];
        row.extend(
            targets
                .iter()
                .map(|to| ui::format_optional_cell(rates.rate(from, to), |r| format!("{r}"))),
        );
        table.add_row(row);
    }
    table
}

pub fn run(rates: &RateTable) {
    let title = match rates.fetched_at() {
        Some(at) => format!("Exchange rates (fetched {})", at.format("%Y-%m-%d %H:%M UTC")),
        None => "Exchange rates (built-in)".to_string(),
    };
    println!("{}\n", ui::style_text(&title, ui::StyleType::Title));
    println!("{}", rates_table(rates));
    println!(
        "\n{}",
        ui::style_text(
            "Rates are approximate and applied as-is: 1 FROM = rate TO",
            ui::StyleType::Subtle
        )
    );
}
