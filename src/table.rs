//! Console tables in the `fancy_grid` style
//!
//! Cells may span several lines; each row grows to its tallest cell.

/// A table with a header row and any number of body rows
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) -> &mut Self {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths = vec![0; self.column_count()];
        for row in std::iter::once(&self.headers).chain(self.rows.iter()) {
            for (i, cell) in row.iter().enumerate() {
                let w = cell.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                widths[i] = widths[i].max(w);
            }
        }
        widths
    }

    fn border(widths: &[usize], left: char, fill: char, mid: char, right: char) -> String {
        let mut line = String::new();
        line.push(left);
        for (i, w) in widths.iter().enumerate() {
            if i > 0 {
                line.push(mid);
            }
            line.extend(std::iter::repeat(fill).take(w + 2));
        }
        line.push(right);
        line
    }

    fn render_row(row: &[String], widths: &[usize], out: &mut Vec<String>) {
        let cell_lines: Vec<Vec<&str>> = (0..widths.len())
            .map(|i| row.get(i).map(|c| c.lines().collect()).unwrap_or_default())
            .collect();
        let height = cell_lines.iter().map(Vec::len).max().unwrap_or(0).max(1);
        for line_no in 0..height {
            let mut line = String::from("│");
            for (i, w) in widths.iter().enumerate() {
                let text = cell_lines[i].get(line_no).copied().unwrap_or("");
                let pad = w - text.chars().count();
                line.push(' ');
                line.push_str(text);
                line.extend(std::iter::repeat(' ').take(pad + 1));
                line.push('│');
            }
            out.push(line);
        }
    }

    /// Render the table as a string without a trailing newline
    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut lines = vec![Self::border(&widths, '╒', '═', '╤', '╕')];
        Self::render_row(&self.headers, &widths, &mut lines);
        lines.push(Self::border(&widths, '╞', '═', '╪', '╡'));
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                lines.push(Self::border(&widths, '├', '─', '┼', '┤'));
            }
            Self::render_row(row, &widths, &mut lines);
        }
        lines.push(Self::border(&widths, '╘', '═', '╧', '╛'));
        lines.join("\n")
    }

    pub fn print(&self) {
        println!("{}", self.render());
    }
}

/// Greedy word wrap: lines hold at most `max_chars` characters where possible.
///
/// Words longer than `max_chars` are kept whole on their own line.
pub fn wrap_words(text: &str, max_chars: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    lines.push(current);
    lines.join("\n")
}
