use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, FormatBorder, Workbook, Worksheet};
use serde::Deserialize;

use crate::{
    error::AppError,
    model::{
        column::{Cell, Column, export_columns},
        record::TransactionTable,
    },
};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const SHEET_NAME: &str = "Data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Csv => "filtered_data.csv",
            Self::Xlsx => "filtered_data.xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

pub fn serialize(table: &TransactionTable, format: ExportFormat) -> Result<Vec<u8>, AppError> {
    let columns = export_columns(table);
    match format {
        ExportFormat::Csv => to_csv(table, &columns),
        ExportFormat::Xlsx => to_xlsx(table, &columns),
    }
}

/// UTF-8 with a byte-order mark so spreadsheet tools pick the right encoding.
fn to_csv(table: &TransactionTable, columns: &[Column]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(columns.iter().map(|c| c.header()))?;
    for record in table.rows() {
        writer.write_record(columns.iter().map(|c| c.cell(record).to_text()))?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color("2C5F8A")
        .set_font_color("FFFFFF")
        .set_border(FormatBorder::Thin)
}

fn to_xlsx(table: &TransactionTable, columns: &[Column]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    // Fixed creation time keeps identical tables byte-identical.
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    write_sheet(sheet, table, columns)?;

    Ok(workbook.save_to_buffer()?)
}

fn write_sheet(
    sheet: &mut Worksheet,
    table: &TransactionTable,
    columns: &[Column],
) -> Result<(), AppError> {
    let header = header_format();
    for (col, column) in columns.iter().enumerate() {
        sheet.write_with_format(0, col as u16, column.header(), &header)?;
    }

    for (i, record) in table.rows().iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, column) in columns.iter().enumerate() {
            let col = col as u16;
            match column.cell(record) {
                Cell::Integer(n) => sheet.write_number(row, col, n as f64)?,
                Cell::Number(n) => sheet.write_number(row, col, n)?,
                Cell::Text(s) => sheet.write_string(row, col, s)?,
                Cell::Empty => continue,
            };
        }
    }

    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}
