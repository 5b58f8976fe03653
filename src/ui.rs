use std::ops::Range;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style as RatStyle,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row as RatatuiRow, Table as RatatuiTable},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, Level};
use crate::config::Action;
use crate::mode::Mode;

/// Widest a column is drawn; longer values are cut with an ellipsis
pub const MAX_COL_WIDTH: usize = 40;
const MIN_COL_WIDTH: usize = 3;
const COLUMN_SPACING: usize = 1;

pub const EMPTY_RESULT: &str = "No matching rows found.";

/// Screen regions, top to bottom
pub struct Areas {
    pub search: Rect,
    pub table: Rect,
    pub status: Rect,
    pub message: Rect,
}

pub fn areas(size: Rect) -> Areas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(size);

    Areas { search: chunks[0], table: chunks[1], status: chunks[2], message: chunks[3] }
}

/// The table area minus its border
fn inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

pub fn render(frame: &mut Frame, app: &App) {
    let areas = areas(frame.size());

    if let Some(bg) = app.style.background() {
        frame.render_widget(Block::default().style(RatStyle::default().bg(bg)), frame.size());
    }

    render_search_bar(frame, app, areas.search);
    render_table(frame, app, areas.table);
    render_status_bar(frame, app, areas.status);
    render_message_line(frame, app, areas.message);
}

fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let style = &app.style;
    let query = app.explorer.query();

    let line = match app.mode {
        Mode::Search => {
            let prompt = "/";
            let x = area.x + (prompt.len() + query.width()) as u16;
            frame.set_cursor(x.min(area.right().saturating_sub(1)), area.y);
            Line::from(vec![
                Span::styled(prompt, style.search_prompt()),
                Span::styled(query.to_string(), style.search_text()),
            ])
        }
        Mode::Normal if !query.is_empty() => Line::from(vec![
            Span::styled("Filter: ", style.search_prompt()),
            Span::styled(query.to_string(), style.search_text()),
        ]),
        Mode::Normal => {
            let key = app.keys().key_for(Action::Search).unwrap_or('/');
            Line::from(Span::styled(format!("Press {} to search", key), style.empty_state()))
        }
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Natural width of each column on the current page: header plus sort indicator, then cells
pub fn column_widths(app: &App) -> Vec<usize> {
    let explorer = &app.explorer;
    let page = explorer.visible_page();

    explorer
        .headers()
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let header = name.width() + explorer.sort().indicator(name).width();
            let content = page.rows.iter().map(|row| display_value(row.get(col)).width()).max().unwrap_or(0);
            header.max(content).clamp(MIN_COL_WIDTH, MAX_COL_WIDTH)
        })
        .collect()
}

/// Width of the row-number gutter
fn gutter_width(total_rows: usize) -> usize {
    total_rows.to_string().len().max(3)
}

/// The run of columns that fits in `available` cells, always including `selected`.
/// Scrolls right only as far as needed to show the selected column.
pub fn column_window(widths: &[usize], leading: usize, available: usize, selected: usize) -> Range<usize> {
    if widths.is_empty() {
        return 0..0;
    }
    let selected = selected.min(widths.len() - 1);
    let span = |range: Range<usize>| -> usize {
        leading + widths[range].iter().map(|w| w + COLUMN_SPACING).sum::<usize>()
    };

    let mut start = 0;
    while start < selected && span(start..selected + 1) > available {
        start += 1;
    }

    let mut end = selected + 1;
    while end < widths.len() && span(start..end + 1) <= available {
        end += 1;
    }
    start..end
}

/// Column under horizontal offset `x` (relative to the table's inner area)
pub fn column_at(widths: &[usize], window: Range<usize>, leading: usize, x: usize) -> Option<usize> {
    let mut left = leading + COLUMN_SPACING;
    if x < left {
        return None;
    }
    let last = window.end.checked_sub(1)?;
    for col in window {
        let right = left + widths[col];
        // the last column stretches to the edge
        if x < right || col == last {
            return Some(col);
        }
        if x < right + COLUMN_SPACING {
            return None;
        }
        left = right + COLUMN_SPACING;
    }
    None
}

/// Header column at screen position (x, y), for mouse clicks
pub fn header_column_at(app: &App, size: Rect, x: u16, y: u16) -> Option<usize> {
    let area = inner(areas(size).table);
    if y != area.y || x < area.x || x >= area.right() {
        return None;
    }

    let widths = column_widths(app);
    let leading = gutter_width(app.explorer.match_count());
    let window = column_window(&widths, leading, area.width as usize, app.selected_col);
    column_at(&widths, window, leading, (x - area.x) as usize)
}

/// Newlines and tabs would break the grid
fn display_value(s: &str) -> String {
    s.chars().map(|c| if c == '\n' || c == '\r' || c == '\t' { ' ' } else { c }).collect()
}

/// Cut `s` to at most `max` display cells, marking the cut with an ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let style = &app.style;
    let explorer = &app.explorer;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.file_io.file_name()));
    let body = block.inner(area);

    let widths = column_widths(app);
    let leading = gutter_width(explorer.match_count());
    let window = column_window(&widths, leading, body.width as usize, app.selected_col);

    let mut constraints = vec![Constraint::Length(leading as u16)];
    constraints.extend(window.clone().map(|col| Constraint::Length(widths[col] as u16)));

    let mut header_cells = vec![Cell::from("#").style(style.row_number())];
    for col in window.clone() {
        let name = &explorer.headers()[col];
        let indicator = explorer.sort().indicator(name);
        let label = truncate(&format!("{}{}", name, indicator), widths[col]);
        let header_style = style.header(col == app.selected_col, !indicator.is_empty());
        header_cells.push(Cell::from(label).style(header_style));
    }

    let page = explorer.visible_page();
    let rows: Vec<RatatuiRow> = page
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut cells = vec![Cell::from((page.info.first_row + i).to_string()).style(style.row_number())];
            for col in window.clone() {
                let value = truncate(&display_value(row.get(col)), widths[col]);
                cells.push(Cell::from(value).style(style.cell(i % 2 == 1)));
            }
            RatatuiRow::new(cells)
        })
        .collect();

    let table = RatatuiTable::new(rows, constraints)
        .header(RatatuiRow::new(header_cells))
        .column_spacing(COLUMN_SPACING as u16)
        .block(block);
    frame.render_widget(table, area);

    if page.rows.is_empty() && body.height > 1 {
        let notice = Rect { y: body.y + 1 + (body.height - 1) / 2, height: 1, ..body };
        let text = if explorer.table().col_count() == 0 { "No data loaded." } else { EMPTY_RESULT };
        frame.render_widget(
            Paragraph::new(Span::styled(text, style.empty_state())).alignment(Alignment::Center),
            notice,
        );
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let style = &app.style;
    let explorer = &app.explorer;
    let info = explorer.page_info();
    let total = explorer.table().row_count();

    let rows = if explorer.query().is_empty() {
        format!("{} rows", total)
    } else {
        format!("{} of {} rows", info.total_rows, total)
    };

    let left = vec![
        Span::styled(format!(" {} ", app.mode.display_name()), style.status_mode(&app.mode)),
        Span::raw(" "),
        Span::raw(app.file_io.file_name()),
        Span::raw("  "),
        Span::raw(rows),
        Span::raw("  "),
        Span::raw(format!("sort: {}", explorer.sort())),
    ];
    let right = format!(
        " {}Page {} of {}{} | {}/page ",
        if info.has_prev() { "◀ " } else { "" },
        info.current_page,
        info.total_pages,
        if info.has_next() { " ▶" } else { "" },
        explorer.page_state().page_size
    );

    let used: usize = left.iter().map(|s| s.content.width()).sum();
    let gap = (area.width as usize).saturating_sub(used + right.width());

    let mut spans = left;
    spans.push(Span::raw(" ".repeat(gap)));
    spans.push(Span::styled(right, style.page_info()));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(style.status_bar()), area);
}

fn render_message_line(frame: &mut Frame, app: &App, area: Rect) {
    let Some(message) = &app.message else {
        return;
    };
    let msg_style = match message.level {
        Level::Info => app.style.message_info(),
        Level::Warning => app.style.message_warning(),
        Level::Error => app.style.message_error(),
    };
    frame.render_widget(Paragraph::new(Span::styled(message.text.as_str(), msg_style)), area);
}
