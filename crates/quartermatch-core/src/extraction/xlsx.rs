use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};

use crate::error::QuartermatchError;
use crate::extraction::{Cell, SpreadsheetRow};

/// Read every row of one worksheet as typed cells.
///
/// Rows start at the top of the used range. Cell index 0 is always column
/// A, so literal column offsets agree with the sheet's own columns.
pub fn read_sheet_rows(bytes: &[u8], sheet_name: &str) -> Result<Vec<SpreadsheetRow>, QuartermatchError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
        .map_err(|e| QuartermatchError::Spreadsheet(format!("failed to open xlsx: {e}")))?;

    let sheet = workbook.worksheet_range(sheet_name).map_err(|e| {
        QuartermatchError::Spreadsheet(format!("sheet '{sheet_name}' not found: {e}"))
    })?;

    let rows = rows_from_range(&sheet);

    tracing::debug!(sheet = sheet_name, rows = rows.len(), "worksheet loaded");

    Ok(rows)
}

/// Rows of a used range, left-padded with empty cells up to its first column.
fn rows_from_range(range: &Range<Data>) -> Vec<SpreadsheetRow> {
    let first_col = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    range
        .rows()
        .map(|row| {
            let mut cells = vec![Cell::Empty; first_col];
            cells.extend(row.iter().map(to_cell));
            SpreadsheetRow::new(cells)
        })
        .collect()
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Float(*f),
        Data::Int(i) => Cell::Int(*i),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Empty => Cell::Empty,
        Data::DateTime(dt) => Cell::Text(dt.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("{e}")),
    }
}
