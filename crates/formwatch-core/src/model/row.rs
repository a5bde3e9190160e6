use serde::{Deserialize, Serialize};

/// One source record: an ordered sequence of string cells
///
/// Cell 0 is the identity key (a form submission timestamp in practice).
/// Trailing empty cells are dropped on construction because the sheet API
/// omits them, so `[t1, A, ""]` and `[t1, A]` describe the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    /// Build a row, trimming trailing empty cells
    pub fn new(mut cells: Vec<String>) -> Self {
        while cells.last().is_some_and(|c| c.is_empty()) {
            cells.pop();
        }
        Self { cells }
    }

    /// The identity key (cell 0), empty if the row has no cells
    pub fn key(&self) -> &str {
        self.cells.first().map(String::as_str).unwrap_or("")
    }

    /// True when the identity key is empty or whitespace (an unused sheet row)
    pub fn is_blank(&self) -> bool {
        self.key().trim().is_empty()
    }

    /// Get a cell by column index
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    /// All cells, trailing blanks already trimmed
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Number of cells after trimming
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl From<Vec<String>> for Row {
    fn from(cells: Vec<String>) -> Self {
        Row::new(cells)
    }
}

impl From<Row> for Vec<String> {
    fn from(row: Row) -> Self {
        row.cells
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Row::new(iter.into_iter().map(Into::into).collect())
    }
}
