use crate::NamespaceError;

/// Column/row grid parsed from delimited text.
///
/// Deliberately basic: cells are trimmed, empty lines skipped, quoting and
/// escaped delimiters are not supported.
#[derive(Debug, Clone, Default)]
pub struct CsvGrid {
    rows: Vec<Vec<String>>,
}

impl CsvGrid {
    /// Parses `data` into a grid, requiring every row to have the same
    /// number of columns as the first.
    pub fn parse(
        data: &str,
        column_delimiter: char,
        row_delimiter: char,
    ) -> Result<Self, NamespaceError> {
        let mut rows: Vec<Vec<String>> = Vec::new();

        for line in data.trim().split(row_delimiter) {
            if line.trim().is_empty() {
                continue;
            }

            let cols: Vec<String> = line
                .trim()
                .split(column_delimiter)
                .map(|cell| cell.trim().to_string())
                .collect();
            rows.push(cols);
        }

        if let Some(width) = rows.first().map(Vec::len) {
            if rows.iter().any(|row| row.len() != width) {
                return Err(NamespaceError::TableLayout(
                    "rows do not have equal column counts".to_string(),
                ));
            }
        }

        Ok(CsvGrid { rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, row: usize) -> Option<&[String]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }
}
