use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use rimebench::stats::AccuracyStats;

pub fn print_summary(rows: &[(String, AccuracyStats)], total: &AccuracyStats, ergonomics: bool) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Article").add_attribute(Attribute::Bold),
        Cell::new("Lines"),
        Cell::new("Line%").fg(Color::Cyan),
        Cell::new("Chars"),
        Cell::new("Char%").fg(Color::Cyan),
    ]);
    for i in 1..=4 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for (name, s) in rows {
        table.add_row(stat_row(name, s, false));
    }
    table.add_row(stat_row("TOTAL", total, true));
    println!("\n{table}");

    if ergonomics {
        print_ergonomics(rows, total);
    }
}

fn stat_row(name: &str, s: &AccuracyStats, bold: bool) -> Vec<Cell> {
    let name_cell = if bold {
        Cell::new(name).add_attribute(Attribute::Bold).fg(Color::Green)
    } else {
        Cell::new(name)
    };
    vec![
        name_cell,
        Cell::new(s.lines.to_string()),
        Cell::new(format!("{:.2}", s.line_accuracy())).fg(Color::Cyan),
        Cell::new(s.chars.to_string()),
        Cell::new(format!("{:.2}", s.char_accuracy())).fg(Color::Cyan),
    ]
}

fn print_ergonomics(rows: &[(String, AccuracyStats)], total: &AccuracyStats) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Article").add_attribute(Attribute::Bold),
        Cell::new("AvgCode"),
        Cell::new("SF%").fg(Color::Red),
        Cell::new("LF%"),
        Cell::new("JumpN%"),
        Cell::new("JumpF%"),
    ]);
    for i in 1..=5 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for (name, s) in rows {
        table.add_row(ergo_row(name, s, false));
    }
    table.add_row(ergo_row("TOTAL", total, true));
    println!("\n{table}");
}

fn ergo_row(name: &str, s: &AccuracyStats, bold: bool) -> Vec<Cell> {
    let name_cell = if bold {
        Cell::new(name).add_attribute(Attribute::Bold).fg(Color::Green)
    } else {
        Cell::new(name)
    };
    vec![
        name_cell,
        Cell::new(format!("{:.4}", s.avg_code_len())),
        Cell::new(format!("{:.2}", s.rate_per_stroke(s.same_finger))).fg(Color::Red),
        Cell::new(format!("{:.2}", s.rate_per_stroke(s.little_finger))),
        Cell::new(format!("{:.2}", s.rate_per_stroke(s.row_jump_near))),
        Cell::new(format!("{:.2}", s.rate_per_stroke(s.row_jump_far))),
    ]
}
