use box_drawing::light::*;
use nu_ansi_term::Style;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
}

/// Box-drawn text table.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub title: Option<String>,
    header: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(header: impl IntoIterator<Item = S>) -> Table {
        let header: Vec<String> = header.into_iter().map(|s| s.into()).collect();
        let align = vec![Align::Left; header.len()];
        Table { title: None, header, align, rows: vec![] }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Table {
        self.title = Some(title.into());
        self
    }

    pub fn with_align(mut self, column: usize, align: Align) -> Table {
        if let Some(a) = self.align.get_mut(column) {
            *a = align;
        }
        self
    }

    /// Append a row. Missing cells are left blank, extra cells are dropped.
    pub fn push_row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) {
        let mut row: Vec<String> = cells.into_iter().map(|s| s.into()).collect();
        row.resize(self.header.len(), String::new());
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn widths(&self) -> Vec<usize> {
        (0..self.header.len())
            .map(|col| {
                std::iter::once(&self.header[col])
                    .chain(self.rows.iter().map(|r| &r[col]))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn rule(widths: &[usize], left: &str, mid: &str, right: &str) -> String {
        let segments: Vec<String> = widths.iter().map(|w| HORIZONTAL.repeat(w + 2)).collect();
        format!("{left}{}{right}", segments.join(mid))
    }

    fn line(&self, widths: &[usize], cells: &[String]) -> String {
        let mut line = String::from(VERTICAL);
        for (col, cell) in cells.iter().enumerate() {
            let pad = " ".repeat(widths[col] - cell.chars().count());
            match self.align[col] {
                Align::Left => line.push_str(&format!(" {cell}{pad} ")),
                Align::Right => line.push_str(&format!(" {pad}{cell} ")),
            }
            line.push_str(VERTICAL);
        }
        line
    }

    /// Render the table, painting the title and header with `style` when given.
    pub fn render(&self, style: Option<Style>) -> String {
        let paint = |s: String| match style {
            Some(style) => style.paint(s).to_string(),
            None => s,
        };
        let widths = self.widths();
        let mut lines = vec![];
        if let Some(title) = &self.title {
            lines.push(paint(title.clone()));
        }
        lines.push(Self::rule(&widths, DOWN_RIGHT, DOWN_HORIZONTAL, DOWN_LEFT));
        lines.push(paint(self.line(&widths, &self.header)));
        lines.push(Self::rule(&widths, VERTICAL_RIGHT, VERTICAL_HORIZONTAL, VERTICAL_LEFT));
        for row in &self.rows {
            lines.push(self.line(&widths, row));
        }
        lines.push(Self::rule(&widths, UP_RIGHT, UP_HORIZONTAL, UP_LEFT));
        lines.join("\n")
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(None))
    }
}
