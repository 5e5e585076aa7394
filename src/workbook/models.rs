// src/workbook/models.rs
/// A single spreadsheet cell, detached from the workbook reader's own types.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Label text for the cell, trimmed. Empty cells become `""`.
    pub fn as_label(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => format_number(*n),
            Cell::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
        }
    }

    /// Numeric coercion: numbers pass through, text is parsed after trimming,
    /// anything else (blank, "-", "n/a", booleans) is `None`.
    ///
    /// Booleans are not read as 1/0: a TRUE/FALSE cell in a value column is
    /// not a quantity.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Empty | Cell::Bool(_) => return None,
        };
        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

/// Whole numbers print without a fractional part so year headers read "2021".
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One worksheet as a grid of rows under named columns.
///
/// Row order matters: section headers precede the rows they introduce.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    /// Builds a sheet, padding short rows with `Cell::Empty` up to the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Trimmed text of the first (label) column, one entry per row.
    pub fn labels(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.first().map(Cell::as_label).unwrap_or_default())
            .collect()
    }
}

/// Turns raw header cells into unique column names.
///
/// Blank headers become `Unnamed: <position>`; repeated names get `.1`, `.2`, ...
pub fn header_names(cells: &[Cell]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(cells.len());
    for (idx, cell) in cells.iter().enumerate() {
        let base = match cell.as_label() {
            s if s.is_empty() => format!("Unnamed: {}", idx),
            s => s,
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while names.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        names.push(candidate);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercion() {
        assert_eq!(Cell::Number(12.5).as_number(), Some(12.5));
        assert_eq!(Cell::Text(" 3.25 ".into()).as_number(), Some(3.25));
        assert_eq!(Cell::Text("-".into()).as_number(), None);
        assert_eq!(Cell::Text("NaN".into()).as_number(), None);
        assert_eq!(Cell::Empty.as_number(), None);
        assert_eq!(Cell::Bool(true).as_number(), None);
    }

    #[test]
    fn booleans_are_not_numeric() {
        assert_eq!(Cell::Bool(true).as_number(), None);
        assert_eq!(Cell::Bool(false).as_number(), None);
        assert_eq!(Cell::Bool(true).as_label(), "True");
    }

    #[test]
    fn labels_are_trimmed_text() {
        assert_eq!(Cell::Text("  OECD  ".into()).as_label(), "OECD");
        assert_eq!(Cell::Number(2021.0).as_label(), "2021");
        assert_eq!(Cell::Number(1.5).as_label(), "1.5");
        assert_eq!(Cell::Empty.as_label(), "");
    }

    #[test]
    fn header_names_fill_blanks_and_dedupe() {
        let cells = vec![
            Cell::Empty,
            Cell::Number(2021.0),
            Cell::Text("2021".into()),
            Cell::Empty,
        ];
        assert_eq!(
            header_names(&cells),
            vec!["Unnamed: 0", "2021", "2021.1", "Unnamed: 3"]
        );
    }

    #[test]
    fn short_rows_are_padded() {
        let sheet = RawSheet::new(
            vec!["region".into(), "2021".into(), "2022".into()],
            vec![vec![Cell::from("OECD")]],
        );
        assert_eq!(sheet.rows[0].len(), 3);
        assert_eq!(sheet.rows[0][2], Cell::Empty);
        assert_eq!(sheet.labels(), vec!["OECD"]);
    }
}
