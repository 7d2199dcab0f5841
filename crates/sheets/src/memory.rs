//! An in-process spreadsheet with Sheets API semantics, used for tests
//! and local development.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::api::SheetsApi;
use crate::error::SheetsError;
use crate::models::{
    dimensions, AppendValuesResponse, BatchUpdateValuesResponse, Sheet, SheetProperties,
    SpreadsheetInfo, UpdateValuesResponse, ValueRange, Values,
};
use crate::range::{col_to_letters, format_a1, A1Range};

struct SheetData {
    title: String,
    sheet_id: i64,
    /// Keyed by zero-based (row, col). Empty cells are absent.
    cells: BTreeMap<(u32, u32), Value>,
}

impl SheetData {
    /// Last (row, col) holding data, if any.
    fn extent(&self) -> Option<(u32, u32)> {
        let max_row = self.cells.keys().map(|(r, _)| *r).max()?;
        let max_col = self.cells.keys().map(|(_, c)| *c).max()?;
        Some((max_row, max_col))
    }

    /// Write `values` with the top-left cell at `(row, col)`.
    ///
    /// `null` leaves a cell unchanged and `""` clears it.
    fn put(&mut self, row: u32, col: u32, values: &Values) {
        for (r, cells) in values.iter().enumerate() {
            for (c, value) in cells.iter().enumerate() {
                let key = (row + r as u32, col + c as u32);
                match value {
                    Value::Null => {}
                    Value::String(s) if s.is_empty() => {
                        self.cells.remove(&key);
                    }
                    v => {
                        self.cells.insert(key, v.clone());
                    }
                }
            }
        }
    }

    fn update_response(
        &self,
        spreadsheet_id: &str,
        row: u32,
        col: u32,
        values: &Values,
    ) -> UpdateValuesResponse {
        let (rows, cols, cells) = dimensions(values);
        let updated_range = format_a1(
            &self.title,
            row,
            col,
            row + rows.max(1) - 1,
            col + cols.max(1) - 1,
        );
        UpdateValuesResponse {
            spreadsheet_id: spreadsheet_id.to_string(),
            updated_range,
            updated_rows: rows,
            updated_columns: cols,
            updated_cells: cells,
        }
    }
}

/// A spreadsheet held in memory.
///
/// Cells keep the JSON value they were written with, so a read returns
/// exactly what was written. Every trait call is counted; see
/// [`MemorySheets::calls`].
pub struct MemorySheets {
    spreadsheet_id: String,
    sheets: RwLock<Vec<SheetData>>,
    calls: AtomicUsize,
}

impl Default for MemorySheets {
    fn default() -> Self {
        Self::new("memory-spreadsheet", ["Sheet1"])
    }
}

impl MemorySheets {
    pub fn new<I, S>(spreadsheet_id: impl Into<String>, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sheets = titles
            .into_iter()
            .enumerate()
            .map(|(i, title)| SheetData {
                title: title.into(),
                sheet_id: i as i64,
                cells: BTreeMap::new(),
            })
            .collect();
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheets: RwLock::new(sheets),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of API calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Parse `range` and find the sheet it addresses.
    fn resolve(sheets: &[SheetData], range: &str) -> Result<(usize, A1Range), SheetsError> {
        let parsed = A1Range::parse(range)?;
        let index = match &parsed.sheet {
            Some(title) => sheets.iter().position(|s| &s.title == title),
            None if sheets.is_empty() => None,
            None => Some(0),
        };
        let index = index.ok_or_else(|| SheetsError::Api {
            status: 400,
            message: format!("Unable to parse range: {range}"),
        })?;
        Ok((index, parsed))
    }

    /// Reject values that do not fit a bounded range. A single-cell anchor
    /// accepts a block of any size.
    fn check_fits(range_text: &str, range: &A1Range, values: &Values) -> Result<(), SheetsError> {
        if range.anchor {
            return Ok(());
        }
        let (rows, cols, _) = dimensions(values);
        if let Some(width) = range.width() {
            if cols > width {
                return Err(SheetsError::Api {
                    status: 400,
                    message: format!(
                        "Requested writing within range [{range_text}], but tried writing to column [{}]",
                        col_to_letters(range.start_col() + width)
                    ),
                });
            }
        }
        if let Some(height) = range.height() {
            if rows > height {
                return Err(SheetsError::Api {
                    status: 400,
                    message: format!(
                        "Requested writing within range [{range_text}], but tried writing to row [{}]",
                        range.start_row() + height + 1
                    ),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SheetsApi for MemorySheets {
    fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    async fn read_values(&self, range: &str) -> Result<ValueRange, SheetsError> {
        self.record_call();
        let sheets = self.sheets.read().await;
        let (index, parsed) = Self::resolve(&sheets, range)?;
        let sheet = &sheets[index];

        let (start_row, start_col) = (parsed.start_row(), parsed.start_col());
        let (data_row, data_col) = sheet.extent().unwrap_or((start_row, start_col));
        let end_row = parsed.end.row.unwrap_or(data_row.max(start_row));
        let end_col = parsed.end.col.unwrap_or(data_col.max(start_col));

        let mut values: Values = (start_row..=end_row)
            .map(|r| {
                let mut row: Vec<Value> = (start_col..=end_col)
                    .map(|c| {
                        sheet
                            .cells
                            .get(&(r, c))
                            .cloned()
                            .unwrap_or_else(|| Value::String(String::new()))
                    })
                    .collect();
                while row.last().is_some_and(|v| v.as_str() == Some("")) {
                    row.pop();
                }
                row
            })
            .collect();
        while values.last().is_some_and(Vec::is_empty) {
            values.pop();
        }

        Ok(ValueRange::new(
            format_a1(&sheet.title, start_row, start_col, end_row, end_col),
            values,
        ))
    }

    async fn write_values(
        &self,
        range: &str,
        values: Values,
    ) -> Result<UpdateValuesResponse, SheetsError> {
        self.record_call();
        let mut sheets = self.sheets.write().await;
        let (index, parsed) = Self::resolve(&sheets, range)?;
        Self::check_fits(range, &parsed, &values)?;

        let sheet = &mut sheets[index];
        let (row, col) = (parsed.start_row(), parsed.start_col());
        sheet.put(row, col, &values);
        Ok(sheet.update_response(&self.spreadsheet_id, row, col, &values))
    }

    async fn append_values(
        &self,
        range: &str,
        values: Values,
    ) -> Result<AppendValuesResponse, SheetsError> {
        self.record_call();
        let mut sheets = self.sheets.write().await;
        let (index, parsed) = Self::resolve(&sheets, range)?;
        let width_only = A1Range {
            end: crate::range::Bound {
                col: parsed.end.col,
                row: None,
            },
            ..parsed.clone()
        };
        Self::check_fits(range, &width_only, &values)?;

        let sheet = &mut sheets[index];
        let (start_row, start_col) = (parsed.start_row(), parsed.start_col());
        let in_table = |&(r, c): &(u32, u32)| {
            r >= start_row && c >= start_col && parsed.end.col.map_or(true, |e| c <= e)
        };
        let table: Vec<(u32, u32)> = sheet.cells.keys().copied().filter(in_table).collect();

        let table_range = match (
            table.iter().map(|(r, _)| *r).min(),
            table.iter().map(|(r, _)| *r).max(),
            table.iter().map(|(_, c)| *c).max(),
        ) {
            (Some(first), Some(last), Some(last_col)) => Some((first, last, last_col)),
            _ => None,
        };
        let row = table_range.map_or(start_row, |(_, last, _)| last + 1);

        sheet.put(row, start_col, &values);
        let updates = sheet.update_response(&self.spreadsheet_id, row, start_col, &values);
        Ok(AppendValuesResponse {
            spreadsheet_id: self.spreadsheet_id.clone(),
            table_range: table_range
                .map(|(first, last, last_col)| format_a1(&sheet.title, first, start_col, last, last_col)),
            updates,
        })
    }

    async fn spreadsheet_info(&self) -> Result<SpreadsheetInfo, SheetsError> {
        self.record_call();
        let sheets = self.sheets.read().await;
        Ok(SpreadsheetInfo {
            spreadsheet_id: self.spreadsheet_id.clone(),
            sheets: sheets
                .iter()
                .enumerate()
                .map(|(i, s)| Sheet {
                    properties: SheetProperties {
                        sheet_id: s.sheet_id,
                        title: s.title.clone(),
                        index: i as u32,
                    },
                })
                .collect(),
        })
    }

    async fn batch_update(
        &self,
        data: Vec<ValueRange>,
    ) -> Result<BatchUpdateValuesResponse, SheetsError> {
        self.record_call();
        let mut sheets = self.sheets.write().await;

        // Validate everything before touching any cell.
        let mut targets = Vec::with_capacity(data.len());
        for entry in &data {
            let range = entry.range.as_deref().ok_or_else(|| SheetsError::Api {
                status: 400,
                message: "Invalid data[]: range is required".into(),
            })?;
            let (index, parsed) = Self::resolve(&sheets, range)?;
            Self::check_fits(range, &parsed, &entry.values)?;
            targets.push((index, parsed));
        }

        let mut response = BatchUpdateValuesResponse {
            spreadsheet_id: self.spreadsheet_id.clone(),
            ..Default::default()
        };
        let mut touched = HashSet::new();
        for (entry, (index, parsed)) in data.iter().zip(targets) {
            let sheet = &mut sheets[index];
            let (row, col) = (parsed.start_row(), parsed.start_col());
            sheet.put(row, col, &entry.values);
            let update = sheet.update_response(&self.spreadsheet_id, row, col, &entry.values);
            response.total_updated_rows += update.updated_rows;
            response.total_updated_columns += update.updated_columns;
            response.total_updated_cells += update.updated_cells;
            touched.insert(index);
            response.responses.push(update);
        }
        response.total_updated_sheets = touched.len() as u32;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(v: Value) -> Values {
        serde_json::from_value(v).unwrap()
    }

    #[tokio::test]
    async fn single_cell_write_reports_single_cell_range() {
        let sheets = MemorySheets::default();
        let res = sheets.write_values("Sheet1!A1", rows(json!([["x"]]))).await.unwrap();
        assert_eq!(res.updated_cells, 1);
        assert_eq!(res.updated_range, "Sheet1!A1");
    }

    #[tokio::test]
    async fn single_cell_anchor_takes_a_whole_block() {
        let sheets = MemorySheets::default();
        let res = sheets
            .write_values("Sheet1!A1", rows(json!([["a", "b"], ["c", "d"]])))
            .await
            .unwrap();
        assert_eq!(res.updated_cells, 4);
        assert_eq!(res.updated_range, "Sheet1!A1:B2");

        let read = sheets.read_values("Sheet1!A1:B2").await.unwrap();
        assert_eq!(read.values, rows(json!([["a", "b"], ["c", "d"]])));
    }

    #[tokio::test]
    async fn read_trims_trailing_empties() {
        let sheets = MemorySheets::default();
        sheets
            .write_values("Sheet1!A1:C2", rows(json!([["a", "", "c"], ["d"]])))
            .await
            .unwrap();
        let read = sheets.read_values("Sheet1!A1:D5").await.unwrap();
        assert_eq!(read.values, rows(json!([["a", "", "c"], ["d"]])));
        assert_eq!(read.range.as_deref(), Some("Sheet1!A1:D5"));
    }

    #[tokio::test]
    async fn open_column_read_is_clipped_to_data() {
        let sheets = MemorySheets::default();
        sheets.write_values("Sheet1!B2", rows(json!([[5]]))).await.unwrap();
        let read = sheets.read_values("Sheet1!A:B").await.unwrap();
        assert_eq!(read.values, rows(json!([[], ["", 5]])));
    }

    #[tokio::test]
    async fn write_outside_bounded_range_is_rejected() {
        let sheets = MemorySheets::default();
        let err = sheets
            .write_values("Sheet1!A1:A1", rows(json!([["x", "y"]])))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("tried writing to column [B]"));
    }

    #[tokio::test]
    async fn unknown_sheet_is_an_upstream_error() {
        let sheets = MemorySheets::default();
        let err = sheets.read_values("Nope!A1").await.unwrap_err();
        assert_eq!(err.to_string(), "Unable to parse range: Nope!A1");
    }

    #[tokio::test]
    async fn append_goes_below_existing_table() {
        let sheets = MemorySheets::default();
        sheets
            .write_values("Sheet1!A1:B2", rows(json!([["h1", "h2"], [1, 2]])))
            .await
            .unwrap();
        let res = sheets.append_values("Sheet1!A:B", rows(json!([[3, 4]]))).await.unwrap();
        assert_eq!(res.table_range.as_deref(), Some("Sheet1!A1:B2"));
        assert_eq!(res.updates.updated_range, "Sheet1!A3:B3");
    }

    #[tokio::test]
    async fn batch_update_is_all_or_nothing() {
        let sheets = MemorySheets::default();
        let data = vec![
            ValueRange::new("Sheet1!A1", rows(json!([["ok"]]))),
            ValueRange::new("Missing!A1", rows(json!([["no"]]))),
        ];
        assert!(sheets.batch_update(data).await.is_err());
        let read = sheets.read_values("Sheet1!A1").await.unwrap();
        assert!(read.values.is_empty());
    }
}
