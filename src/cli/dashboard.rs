use super::ui;
use crate::core::dashboard::Dashboard;
use crate::core::format::{format_table, trend_summary};
use crate::core::price::PriceSeries;
use crate::core::returns::ReturnTable;

/// Trailing observations drawn in each row's sparkline.
pub const SPARKLINE_POINTS: usize = 60;

fn render_section(
    title: &str,
    table: &ReturnTable,
    series_for: impl Fn(&str, &str) -> Option<PriceSeries>,
) -> String {
    let formatted = format_table(table);

    let mut grid = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Name")];
    header.extend(formatted.header.iter().map(|h| ui::header_cell(h)));
    header.push(ui::header_cell("Trend"));
    grid.set_header(header);

    for (row, (name, cells)) in table.rows().iter().zip(&formatted.rows) {
        let mut line = vec![comfy_table::Cell::new(name)];
        line.extend(cells.iter().map(ui::return_cell));
        let spark = series_for(&row.key, &row.name)
            .map(|s| ui::sparkline(&s.tail(SPARKLINE_POINTS).values()))
            .unwrap_or_default();
        line.push(comfy_table::Cell::new(spark));
        grid.add_row(line);
    }

    let mut output = format!("{}\n\n", ui::style_text(title, ui::StyleType::Title));
    output.push_str(&grid.to_string());

    let summary = trend_summary(table);
    if !summary.is_empty() {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(&summary, ui::StyleType::Summary)
        ));
    }
    output
}

/// Renders every section of the dashboard for the terminal.
pub fn render(dashboard: &Dashboard) -> Vec<String> {
    let mut sections: Vec<String> = dashboard
        .groups
        .iter()
        .map(|g| {
            render_section(&g.group.title, &g.table, |symbol, _| {
                dashboard.prices().series(symbol)
            })
        })
        .collect();

    if !dashboard.themes.is_empty() {
        sections.push(render_section(
            &dashboard.themes_title,
            &dashboard.themes,
            |_, name| {
                dashboard
                    .theme_series
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, s)| s.clone())
            },
        ));
    }
    sections
}

pub fn display(dashboard: &Dashboard, updated: &str) {
    println!(
        "{}",
        ui::style_text(&format!("Updated: {updated}"), ui::StyleType::Subtle)
    );
    for section in render(dashboard) {
        println!("\n{section}");
    }
    ui::print_separator();
}
