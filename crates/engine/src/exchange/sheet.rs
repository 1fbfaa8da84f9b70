//! Spreadsheet codec: a first sheet read as rows of [`Cell`]s, and rows of
//! cells written back out as `.xlsx` or `.csv`.

use std::{fmt, io::Cursor};

use calamine::{Data, Reader, Xlsx};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_xlsxwriter::{Format, Workbook};

use crate::{EngineError, ResultEngine};

use super::{SHEET_NAME, SheetFormat};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Cell {
    Empty,
    Text(String),
    Number(f64),
    /// Excel serial date (days since 1899-12-30, fraction is time of day).
    Date(f64),
}

impl Cell {
    pub(crate) fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Date(_) => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s.trim()),
            Self::Number(n) if n.fract() == 0.0 => write!(f, "{n:.0}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Date(serial) => match excel_serial_to_datetime(*serial) {
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
                None => write!(f, "{serial}"),
            },
        }
    }
}

/// Convert an Excel serial date to a UTC instant.
///
/// The Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug).
pub(crate) fn excel_serial_to_datetime(serial: f64) -> Option<DateTime<Utc>> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let naive = base.checked_add_signed(Duration::milliseconds(millis))?;
    Some(naive.and_utc())
}

/// Read every row of the first sheet.
pub(crate) fn read(format: SheetFormat, bytes: &[u8]) -> ResultEngine<Vec<Vec<Cell>>> {
    match format {
        SheetFormat::Csv => read_csv(bytes),
        SheetFormat::Xlsx => read_xlsx(bytes),
    }
}

fn read_csv(bytes: &[u8]) -> ResultEngine<Vec<Vec<Cell>>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::text).collect());
    }
    Ok(rows)
}

fn read_xlsx(bytes: &[u8]) -> ResultEngine<Vec<Vec<Cell>>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EngineError::Spreadsheet("workbook has no sheets".to_string()))??;

    let rows = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => Cell::Empty,
                    Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                        Cell::text(s.clone())
                    }
                    Data::Float(f) => Cell::Number(*f),
                    Data::Int(i) => Cell::Number(*i as f64),
                    Data::Bool(b) => Cell::Text(b.to_string()),
                    Data::DateTime(dt) => Cell::Date(dt.as_f64()),
                    Data::Error(err) => Cell::Text(err.to_string()),
                })
                .collect()
        })
        .collect();
    Ok(rows)
}

/// Write `header` followed by `rows` into a single-sheet document.
pub(crate) fn write(
    format: SheetFormat,
    header: &[&str],
    rows: &[Vec<Cell>],
) -> ResultEngine<Vec<u8>> {
    match format {
        SheetFormat::Csv => write_csv(header, rows),
        SheetFormat::Xlsx => write_xlsx(header, rows),
    }
}

fn write_csv(header: &[&str], rows: &[Vec<Cell>]) -> ResultEngine<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer
        .into_inner()
        .map_err(|err| EngineError::Spreadsheet(err.to_string()))
}

fn write_xlsx(header: &[&str], rows: &[Vec<Cell>]) -> ResultEngine<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;
        for (col, title) in header.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *title, &bold)?;
        }
        for (idx, row) in rows.iter().enumerate() {
            let row_num = (idx + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) => {
                        worksheet.write_string(row_num, col, s.as_str())?;
                    }
                    Cell::Number(n) | Cell::Date(n) => {
                        worksheet.write_number(row_num, col, *n)?;
                    }
                }
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}
