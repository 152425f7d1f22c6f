use crate::record::LinkRecord;
use crate::{Error, Result};

/// One table row: a record and whether its checkbox is ticked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    record: LinkRecord,
    checked: bool,
}

impl Row {
    pub fn record(&self) -> &LinkRecord {
        &self.record
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }
}

/// Records paired with their checkbox state, in table order
///
/// Every record owns exactly one flag, so the flag count always matches the
/// record count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    rows: Vec<Row>,
}

impl Selection {
    /// Build the initial selection: only the trailing self-record is checked
    pub fn new(records: Vec<LinkRecord>) -> Self {
        let last = records.len().checked_sub(1);
        let rows = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| Row {
                record,
                checked: Some(index) == last,
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Set a single row's checkbox (0-based index)
    pub fn set_checked(&mut self, index: usize, checked: bool) -> Result<()> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(Error::RowOutOfRange {
                row: index + 1,
                len,
            })?;
        row.checked = checked;
        Ok(())
    }

    /// Flip a single row's checkbox, returning its new state
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        let checked = !self.is_checked(index)?;
        self.set_checked(index, checked)?;
        Ok(checked)
    }

    pub fn is_checked(&self, index: usize) -> Result<bool> {
        self.rows
            .get(index)
            .map(Row::is_checked)
            .ok_or(Error::RowOutOfRange {
                row: index + 1,
                len: self.rows.len(),
            })
    }

    /// Make every checkbox match the select-all control
    pub fn select_all(&mut self, checked: bool) {
        for row in &mut self.rows {
            row.checked = checked;
        }
    }

    /// True when every row is checked (and there is at least one row)
    pub fn all_checked(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(Row::is_checked)
    }

    pub fn checked_count(&self) -> usize {
        self.rows.iter().filter(|row| row.checked).count()
    }

    /// Export is enabled iff at least one row is checked
    pub fn export_enabled(&self) -> bool {
        self.rows.iter().any(Row::is_checked)
    }

    /// Checked records in table order
    pub fn checked_records(&self) -> Vec<&LinkRecord> {
        self.rows
            .iter()
            .filter(|row| row.checked)
            .map(Row::record)
            .collect()
    }
}
