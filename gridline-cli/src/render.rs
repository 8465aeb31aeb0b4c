//! Plain terminal rendering of table views and log entries.

use crossterm::style::Stylize;
use gridline::table::{CheckState, ColumnKind, SortDirection, TableView, ViewColumn, ViewRow};
use gridline::{LogEntry, LogLevel};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Pixels per terminal cell when mapping column widths.
const PX_PER_CELL: u32 = 8;
const MIN_CELLS: usize = 3;

fn cells(column: &ViewColumn) -> usize {
    ((column.width / PX_PER_CELL) as usize).max(MIN_CELLS)
}

/// Truncate to `width` display cells, marking the cut with an ellipsis.
pub fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        let pad = width - text.width();
        return format!("{text}{}", " ".repeat(pad));
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

fn header_text(column: &ViewColumn, check: Option<CheckState>) -> String {
    match column.kind {
        ColumnKind::Select => match check {
            Some(CheckState::Checked) => "[x]".to_string(),
            Some(CheckState::Indeterminate) => "[-]".to_string(),
            _ => "[ ]".to_string(),
        },
        ColumnKind::Actions => "Actions".to_string(),
        ColumnKind::Data => match column.sort {
            Some(SortDirection::Ascending) => format!("{} ↑", column.header),
            Some(SortDirection::Descending) => format!("{} ↓", column.header),
            None => column.header.clone(),
        },
    }
}

fn cell_text(column: &ViewColumn, row: &ViewRow, index: usize) -> String {
    match column.kind {
        ColumnKind::Select if row.selected => "[x]".to_string(),
        ColumnKind::Select => "[ ]".to_string(),
        ColumnKind::Actions => row
            .actions
            .iter()
            .map(|a| a.label.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        ColumnKind::Data => row.cells.get(index).cloned().unwrap_or_default(),
    }
}

/// Render a table view as lines of text.
pub fn table(view: &TableView, color: bool) -> Vec<String> {
    let mut lines = Vec::with_capacity(view.rows.len() + 4);

    let header = view
        .columns
        .iter()
        .map(|c| fit(&header_text(c, view.header_check), cells(c)))
        .collect::<Vec<_>>()
        .join(" │ ");
    lines.push(if color {
        header.bold().to_string()
    } else {
        header
    });

    lines.push(
        view.columns
            .iter()
            .map(|c| "─".repeat(cells(c)))
            .collect::<Vec<_>>()
            .join("─┼─"),
    );

    for row in &view.rows {
        let line = view
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| fit(&cell_text(c, row, i), cells(c)))
            .collect::<Vec<_>>()
            .join(" │ ");
        lines.push(if color && row.selected {
            line.reverse().to_string()
        } else {
            line
        });
    }

    let page = &view.page;
    let summary = if page.total_items == 0 {
        "No rows".to_string()
    } else {
        format!(
            "{}-{} of {} · page {}/{} · {} per page",
            page.start_index,
            page.end_index,
            page.total_items,
            page.page,
            page.total_pages,
            page.page_size
        )
    };
    lines.push(String::new());
    lines.push(if color {
        summary.dark_grey().to_string()
    } else {
        summary
    });

    if let Some(batch) = &view.batch {
        let actions: Vec<&str> = batch.actions.iter().map(|a| a.label.as_str()).collect();
        lines.push(format!(
            "{} selected: {}",
            batch.selected_count,
            actions.join(", ")
        ));
    }
    lines
}

/// Render one log entry, colored by level.
pub fn log_entry(entry: &LogEntry, color: bool) -> String {
    let text = entry.to_text();
    if !color {
        return text;
    }
    match entry.level {
        LogLevel::Error => text.red().to_string(),
        LogLevel::Warn => text.yellow().to_string(),
        LogLevel::Debug | LogLevel::Verbose => text.dark_grey().to_string(),
        LogLevel::Info | LogLevel::Other => text,
    }
}

/// Render a stack frame printed apart from its entry.
pub fn frame(line: &str, color: bool) -> String {
    if color {
        line.dark_grey().to_string()
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("日本語テキスト", 5), "日本…");
    }
}
