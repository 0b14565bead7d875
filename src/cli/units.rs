use super::ui;
use crate::core::UnitCategory;
use crate::core::units::UnitRegistry;
use comfy_table::{Cell, Table};

/// Table of categories and the units offered for each.
pub fn categories_table(categories: &[UnitCategory]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Category"), ui::header_cell("Units")]);
    for category in categories {
        table.add_row(vec![
            Cell::new(category.to_string()),
            Cell::new(category.units().join(", ")),
        ]);
    }
    table
}

/// Table of one category's units with the dimension each one measures.
pub fn category_detail_table(category: UnitCategory) -> Table {
    let registry = UnitRegistry::new();
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Unit"), ui::header_cell("Dimension")]);
    for unit in category.units() {
        let dimension = match category {
            UnitCategory::Currency => "currency".to_string(),
            _ => registry
                .parse(unit)
                .map(|u| u.dimension().to_string())
                .unwrap_or_else(|e| e.to_string()),
        };
        table.add_row(vec![Cell::new(unit), Cell::new(dimension)]);
    }
    table
}

pub fn run(category: Option<UnitCategory>) {
    match category {
        Some(category) => {
            println!("{}\n", ui::style_text(&category.to_string(), ui::StyleType::Title));
            println!("{}", category_detail_table(category));
        }
        None => println!("{}", categories_table(&UnitCategory::ALL)),
    }
    println!(
        "\n{}",
        ui::style_text(
            "Tip: any unit the registry knows works, e.g. `uconv convert 1 km/h m/s`",
            ui::StyleType::Subtle
        )
    );
}
