use crate::utils::text::truncate_text_unicode;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};
use crossterm::terminal;

/// A record that can be shown as one table row
pub trait Tabular {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// Formatter for list output
pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl TableDisplay {
    /// Width from the terminal, colors only when stdout is a terminal.
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }

    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _rows)) => Some((cols as usize).clamp(40, 200)),
            Err(_) => Some(80),
        }
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Widest any single cell may be before it is cut with `...`.
    fn cell_width_limit(&self, columns: usize) -> usize {
        let width = self.max_width.unwrap_or(80);
        (width / columns.max(1)).max(12) * 2
    }

    fn configure_table_width(&self, table: &mut Table) {
        let width = self.max_width.unwrap_or(80);
        table.set_width(width.saturating_sub(2).max(40) as u16);
    }

    fn header_cell(&self, title: &str) -> Cell {
        if self.use_colors {
            Cell::new(title)
                .add_attribute(Attribute::Bold)
                .fg(Color::Cyan)
        } else {
            Cell::new(title)
        }
    }

    pub fn render(&self, headers: &[&str], rows: &[Vec<String>]) -> String {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        self.configure_table_width(&mut table);

        table.set_header(headers.iter().map(|h| self.header_cell(h)));

        let limit = self.cell_width_limit(headers.len());
        for row in rows {
            table.add_row(
                row.iter()
                    .map(|value| Cell::new(truncate_text_unicode(value, limit))),
            );
        }

        table.to_string()
    }

    pub fn render_items<T: Tabular>(&self, items: &[T]) -> String {
        let rows: Vec<Vec<String>> = items.iter().map(Tabular::row).collect();
        self.render(&T::headers(), &rows)
    }
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}
