//! Table view model shared by every panel.
//!
//! A table body is always replaced wholesale from the latest payload. Row
//! buttons carry the [`Action`] they trigger; the controller dispatches
//! actions in one place, so rebuilding a body never re-wires anything.
//!
//! Header cells survive body rebuilds. That is where the responsive layout
//! keeps its state: in compact mode the inner headers are replaced by their
//! position and the originals are cached on the table until restored.

use super::Action;

/// Colour family of a cell, badge or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Success,
    Danger,
    Warning,
    Primary,
    Muted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub label: String,
    pub tone: Tone,
    pub action: Action,
}

impl Button {
    pub fn new(label: &str, tone: Tone, action: Action) -> Self {
        Self {
            label: label.to_string(),
            tone,
            action,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Toned(String, Tone),
    Badge(String, Tone),
    Buttons(Vec<Button>),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// The cell as plain text, the way it reads on screen without colour.
    pub fn plain(&self) -> String {
        match self {
            Self::Text(s) | Self::Toned(s, _) => s.clone(),
            Self::Badge(s, _) => format!("[{s}]"),
            Self::Buttons(buttons) => buttons
                .iter()
                .map(|b| format!("<{}>", b.label))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// A data row; `key` is the id of the entity it shows, when it has one.
    Data { key: Option<String>, cells: Vec<Cell> },
    /// A single message spanning `colspan` columns.
    Placeholder {
        text: String,
        colspan: usize,
        tone: Tone,
    },
}

impl Row {
    pub fn keyed(key: Option<String>, cells: Vec<Cell>) -> Self {
        Self::Data { key, cells }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Data { key, .. } => key.as_deref(),
            Self::Placeholder { .. } => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    original_headers: Option<Vec<String>>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            original_headers: None,
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// A placeholder row spanning every column.
    pub fn placeholder(&self, text: &str, tone: Tone) -> Row {
        Row::Placeholder {
            text: text.to_string(),
            colspan: self.column_count(),
            tone,
        }
    }

    /// Replace the whole body.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Remove every row keyed `key`. Returns how many were removed.
    pub fn remove_keyed(&mut self, key: &str) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| row.key() != Some(key));
        before - self.rows.len()
    }

    /// Key of the data row at a 1-based position.
    pub fn key_at(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .and_then(Row::key)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.rows.iter().filter_map(Row::key).collect()
    }

    // -- Responsive headers --

    pub fn is_compact(&self) -> bool {
        self.original_headers.is_some()
    }

    /// Replace every header except the first and last by its 1-based
    /// position, caching the originals. No-op when already compact.
    pub fn simplify_headers(&mut self) {
        if self.original_headers.is_some() {
            return;
        }
        self.original_headers = Some(self.headers.clone());
        let last = self.headers.len().saturating_sub(1);
        for (index, header) in self.headers.iter_mut().enumerate() {
            if index > 0 && index < last {
                *header = (index + 1).to_string();
            }
        }
    }

    /// Put the cached headers back and drop the cache. No-op when not compact.
    pub fn restore_headers(&mut self) {
        if let Some(original) = self.original_headers.take() {
            self.headers = original;
        }
    }

    pub fn apply_layout(&mut self, compact: bool) {
        if compact {
            self.simplify_headers();
        } else {
            self.restore_headers();
        }
    }
}
