use std::fmt::Write;

use crate::app::{categories::CategoryRegistry, graph::project, timer::CategoryTotals};

use super::parse_hex_color;

const BAR_WIDTH: usize = 20;

/// Horizontal bars of time per timer-category.
pub fn render_graph(
    categories: &CategoryRegistry,
    totals: &CategoryTotals,
    use_color: bool,
) -> String {
    let rows = project(categories, totals);
    let label_width = rows.iter().map(|v| v.label.chars().count()).max().unwrap_or(0);

    let mut output = String::new();
    for row in rows {
        let filled = (BAR_WIDTH * row.share.rounded() as usize).div_ceil(100).min(BAR_WIDTH);
        let fill = "█".repeat(filled);
        let fill = match parse_hex_color(&row.color).filter(|_| use_color) {
            Some(color) => color.paint(fill).to_string(),
            None => fill,
        };
        let _ = writeln!(
            output,
            "{:<label_width$} |{fill}{}| {}",
            row.label,
            " ".repeat(BAR_WIDTH - filled),
            row.formatted
        );
    }
    output
}

#[cfg(test)]
mod tests {
    use crate::app::{categories::CategoryRegistry, timer::CategoryTotals};

    use super::render_graph;

    #[test]
    fn graph_rows_for_timer_categories() {
        let totals = CategoryTotals::load(Some(r#"{"bug": 2000, "test": 1000, "idea": 5000}"#));
        let output = render_graph(&CategoryRegistry::default(), &totals, false);
        let lines = output.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Test  |██████████"));
        assert!(lines[2].starts_with("Bug   |████████████████████|"));
        assert!(lines[2].ends_with("00:00:02"));
        assert!(lines[1].contains(&format!("|{}|", " ".repeat(20))));
    }
}
