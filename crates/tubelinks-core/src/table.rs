use crate::selection::Selection;
use serde::Serialize;

/// Text shown instead of a table body when there is nothing to list
pub const NO_LINKS_FOUND: &str = "没有找到链接";

/// Default on-screen width of the text and URL columns
pub const DEFAULT_CELL_WIDTH: usize = 60;

const ELLIPSIS: char = '…';

/// A cell's on-screen text plus the full string it was cut from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub display: String,
    pub title: String,
}

impl Cell {
    fn new(full: &str, width: usize) -> Self {
        Self {
            display: truncate(full, width),
            title: full.to_string(),
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.display != self.title
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    /// 1-based row number as typed by the user
    pub number: usize,
    pub checked: bool,
    pub text: Cell,
    pub url: Cell,
}

/// Rendered form of the link table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableView {
    Rows {
        rows: Vec<RowView>,
        select_all: bool,
        export_enabled: bool,
    },
    Placeholder {
        message: String,
    },
}

impl TableView {
    /// Render a selection, cutting cells to `width` characters
    pub fn render(selection: &Selection, select_all: bool, width: usize) -> Self {
        if selection.is_empty() {
            return TableView::Placeholder {
                message: NO_LINKS_FOUND.to_string(),
            };
        }

        let rows = selection
            .rows()
            .iter()
            .enumerate()
            .map(|(index, row)| RowView {
                number: index + 1,
                checked: row.is_checked(),
                text: Cell::new(row.record().text(), width),
                url: Cell::new(row.record().url(), width),
            })
            .collect();

        TableView::Rows {
            rows,
            select_all,
            export_enabled: selection.export_enabled(),
        }
    }

    pub fn rows(&self) -> &[RowView] {
        match self {
            TableView::Rows { rows, .. } => rows,
            TableView::Placeholder { .. } => &[],
        }
    }

    pub fn export_enabled(&self) -> bool {
        matches!(self, TableView::Rows { export_enabled: true, .. })
    }
}

/// Cut `text` to at most `width` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, width: usize) -> String {
    if width == 0 || text.chars().count() <= width {
        return text.to_string();
    }

    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push(ELLIPSIS);
    cut
}
