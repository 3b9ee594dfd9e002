//! Minimal Office Open XML workbook codec.
//!
//! Writing produces a single-sheet workbook with inline strings, which every
//! spreadsheet application (and `calamine`) reads without a shared-string
//! table. Reading goes through `calamine` so workbooks saved by other tools
//! are accepted too.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{Cell, Table, TableCodec};
use crate::error::TableError;

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Minimum column width, in characters.
const MIN_COLUMN_WIDTH: usize = 15;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxCodec;

impl XlsxCodec {
    pub fn new() -> Self {
        Self
    }
}

impl TableCodec for XlsxCodec {
    fn write_table(&self, table: &Table, path: &Path) -> Result<(), TableError> {
        let bytes = encode_workbook(table).map_err(|reason| TableError::Encode {
            path: path.to_path_buf(),
            reason,
        })?;

        // Write beside the target and rename, so readers never observe a
        // half-written workbook under the final name.
        let temp = temp_path(path);
        std::fs::write(&temp, &bytes).map_err(|e| TableError::WriteFile {
            path: temp.clone(),
            source: e,
        })?;
        if let Err(e) = std::fs::rename(&temp, path) {
            let _ = std::fs::remove_file(&temp);
            return Err(TableError::WriteFile {
                path: path.to_path_buf(),
                source: e,
            });
        }
        Ok(())
    }

    fn read_table(&self, path: &Path) -> Result<Table, TableError> {
        let decode_err = |reason: String| TableError::Decode {
            path: path.to_path_buf(),
            reason,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| decode_err(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| TableError::EmptyWorkbook(path.to_path_buf()))?
            .map_err(|e| decode_err(e.to_string()))?;

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Ok(Table::default());
        };

        let columns: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(i, data)| match data_to_cell(data) {
                Cell::Empty => format!("Unnamed: {}", i),
                cell => cell.to_string(),
            })
            .collect();

        let mut table = Table::new(columns);
        for row in rows {
            let cells: Vec<Cell> = row.iter().map(data_to_cell).collect();
            if cells.iter().all(Cell::is_empty) {
                continue;
            }
            table.push_row(cells);
        }

        Ok(table)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
    }
}

fn xml_err<E: std::fmt::Display>(e: E) -> String {
    e.to_string()
}

fn encode_workbook(table: &Table) -> Result<Vec<u8>, String> {
    let sheet = sheet_xml(table)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, &[u8]); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
        ("xl/workbook.xml", WORKBOOK_XML.as_bytes()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.as_bytes()),
        ("xl/worksheets/sheet1.xml", &sheet),
    ];
    for (name, content) in parts {
        zip.start_file(name, options).map_err(xml_err)?;
        zip.write_all(content).map_err(xml_err)?;
    }

    let cursor = zip.finish().map_err(xml_err)?;
    Ok(cursor.into_inner())
}

fn sheet_xml(table: &Table) -> Result<Vec<u8>, String> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_err)?;

    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute(("xmlns", SPREADSHEET_NS));
    writer.write_event(Event::Start(worksheet)).map_err(xml_err)?;

    if !table.columns.is_empty() {
        writer
            .write_event(Event::Start(BytesStart::new("cols")))
            .map_err(xml_err)?;
        for (i, width) in column_widths(table).into_iter().enumerate() {
            let index = (i + 1).to_string();
            let width = width.to_string();
            let mut col = BytesStart::new("col");
            col.push_attribute(("min", index.as_str()));
            col.push_attribute(("max", index.as_str()));
            col.push_attribute(("width", width.as_str()));
            col.push_attribute(("customWidth", "1"));
            writer.write_event(Event::Empty(col)).map_err(xml_err)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("cols")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::Start(BytesStart::new("sheetData")))
        .map_err(xml_err)?;

    let header: Vec<Cell> = table.columns.iter().map(|c| Cell::text(c.as_str())).collect();
    write_row(&mut writer, 1, &header)?;
    for (i, row) in table.rows.iter().enumerate() {
        write_row(&mut writer, i + 2, row)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("sheetData")))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new("worksheet")))
        .map_err(xml_err)?;

    Ok(writer.into_inner())
}

fn write_row(writer: &mut Writer<Vec<u8>>, row_number: usize, cells: &[Cell]) -> Result<(), String> {
    let row_ref = row_number.to_string();
    let mut row = BytesStart::new("row");
    row.push_attribute(("r", row_ref.as_str()));
    writer.write_event(Event::Start(row)).map_err(xml_err)?;

    for (i, cell) in cells.iter().enumerate() {
        let cell_ref = format!("{}{}", column_letter(i), row_number);
        match cell {
            Cell::Empty => continue,
            Cell::Number(n) if n.is_finite() => {
                let mut c = BytesStart::new("c");
                c.push_attribute(("r", cell_ref.as_str()));
                writer.write_event(Event::Start(c)).map_err(xml_err)?;
                writer
                    .write_event(Event::Start(BytesStart::new("v")))
                    .map_err(xml_err)?;
                writer
                    .write_event(Event::Text(BytesText::new(&n.to_string())))
                    .map_err(xml_err)?;
                writer
                    .write_event(Event::End(BytesEnd::new("v")))
                    .map_err(xml_err)?;
                writer
                    .write_event(Event::End(BytesEnd::new("c")))
                    .map_err(xml_err)?;
            }
            // Non-finite numbers have no numeric cell representation
            Cell::Number(n) => write_inline_string(writer, &cell_ref, &n.to_string())?,
            Cell::Text(s) => write_inline_string(writer, &cell_ref, s)?,
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new("row")))
        .map_err(xml_err)
}

fn write_inline_string(
    writer: &mut Writer<Vec<u8>>,
    cell_ref: &str,
    text: &str,
) -> Result<(), String> {
    let mut c = BytesStart::new("c");
    c.push_attribute(("r", cell_ref));
    c.push_attribute(("t", "inlineStr"));
    writer.write_event(Event::Start(c)).map_err(xml_err)?;
    writer
        .write_event(Event::Start(BytesStart::new("is")))
        .map_err(xml_err)?;

    let mut t = BytesStart::new("t");
    t.push_attribute(("xml:space", "preserve"));
    writer.write_event(Event::Start(t)).map_err(xml_err)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new("t")))
        .map_err(xml_err)?;

    writer
        .write_event(Event::End(BytesEnd::new("is")))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new("c")))
        .map_err(xml_err)
}

/// Width per column: longest rendered value plus two, never below the minimum.
fn column_widths(table: &Table) -> Vec<usize> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let longest = table
                .rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.to_string().chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0);
            (longest + 2).max(MIN_COLUMN_WIDTH)
        })
        .collect()
}

/// Zero-based column index to spreadsheet letters: 0 -> A, 25 -> Z, 26 -> AA.
fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
