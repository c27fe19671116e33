use super::traits::{Activity, ActivityResult};
use super::{ensure_kind, instance_label};
use crate::entries::{EntryError, EntryHandle};
use xamin_core::{EntryData, FormatKind, Table};

pub const NAME: &str = "table-view";

/// Grid access to tabular entries.
pub struct TableView {
    entry: EntryHandle,
    label: String,
}

impl TableView {
    pub fn new(entry: EntryHandle) -> ActivityResult<Self> {
        ensure_kind(NAME, &entry, &[FormatKind::csv()])?;
        Ok(Self {
            entry,
            label: instance_label(NAME),
        })
    }

    /// `(rows, columns)`, or `None` for an empty table.
    pub fn shape(&self) -> ActivityResult<Option<(usize, usize)>> {
        self.with_table(Table::shape)
    }

    pub fn cell(&self, row: usize, column: usize) -> ActivityResult<Option<String>> {
        self.with_table(|table| table.cell(row, column).map(str::to_string))
    }

    /// Write one cell, padding short rows. Returns false if `row` is out of range.
    pub fn set_cell(&self, row: usize, column: usize, value: &str) -> ActivityResult<bool> {
        let updated = self.entry.update_if(&self.label, |data| {
            let updated = match data {
                EntryData::Table(table) => table.set_cell(row, column, value),
                _ => false,
            };
            (updated, updated)
        })?;
        Ok(updated)
    }

    pub fn append_row(&self, row: Vec<String>) -> ActivityResult<()> {
        self.entry.update(&self.label, |data| {
            if let EntryData::Table(table) = data {
                table.rows.push(row);
            }
        })?;
        Ok(())
    }

    fn with_table<R>(&self, f: impl FnOnce(&Table) -> R) -> ActivityResult<R> {
        let result = self.entry.with_data(|data| data.as_table().map(f))?;
        result.ok_or_else(|| EntryError::NotLoaded.into())
    }
}

impl Activity for TableView {
    fn name(&self) -> &str {
        NAME
    }

    fn entry(&self) -> &EntryHandle {
        &self.entry
    }

    fn describe(&self) -> String {
        match self.shape() {
            Ok(Some((rows, columns))) => format!("{}: {} rows x {} columns", NAME, rows, columns),
            _ => format!("{}: empty table", NAME),
        }
    }

    fn deactivate(&mut self) {
        self.entry.release_writer(&self.label);
    }
}

impl Drop for TableView {
    fn drop(&mut self) {
        self.entry.release_writer(&self.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::{CsvFormat, Entry, EntryId};
    use std::sync::Arc;

    fn table_handle(rows: &[&[&str]]) -> EntryHandle {
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        let mut entry = Entry::new(None, Arc::new(CsvFormat::new(b",".to_vec())));
        entry.set_data(EntryData::Table(Table::new(rows)));
        EntryHandle::new(EntryId(1), entry)
    }

    #[test]
    fn read_and_write_cells() {
        let view = TableView::new(table_handle(&[&["x", "y"], &["1", "2"]])).unwrap();
        assert_eq!(view.shape().unwrap(), Some((2, 2)));
        assert_eq!(view.cell(1, 1).unwrap().as_deref(), Some("2"));

        assert!(view.set_cell(1, 1, "20").unwrap());
        assert!(!view.set_cell(5, 0, "nope").unwrap());
        assert_eq!(view.entry().revision(), 1);
        assert_eq!(view.cell(1, 1).unwrap().as_deref(), Some("20"));
    }

    #[test]
    fn append_row_changes_shape() {
        let view = TableView::new(table_handle(&[&["x", "y"]])).unwrap();
        view.append_row(vec!["3".into(), "4".into()]).unwrap();
        assert_eq!(view.describe(), "table-view: 2 rows x 2 columns");
    }

    #[test]
    fn two_views_share_data() {
        let handle = table_handle(&[&["a"]]);
        let writer = TableView::new(handle.clone()).unwrap();
        let reader = TableView::new(handle).unwrap();

        writer.set_cell(0, 0, "b").unwrap();
        assert_eq!(reader.cell(0, 0).unwrap().as_deref(), Some("b"));
    }
}
