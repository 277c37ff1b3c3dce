use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{Result, ToolError};
use crate::model::{ColIndex, RowIndex};

/// Returns whether `path` names an Office Open XML workbook whose sheet XML
/// can be scanned for blank cells.
pub fn is_xlsx(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xlsm"))
}

/// Positions of the cells in the first sheet that exist in the file but hold
/// no value and no formula, typically styled blanks like `<c r="B2" s="1"/>`.
///
/// calamine folds these into `Empty`, which would make them indistinguishable
/// from cells that are absent.
pub fn first_sheet_blanks(path: &Path) -> Result<Vec<(RowIndex, ColIndex)>> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let Some(r_id) = first_sheet_rel_id(&mut archive)? else {
        return Ok(Vec::new());
    };
    let rels = worksheet_targets(&mut archive)?;
    let sheet_path = rels.get(&r_id).ok_or_else(|| {
        ToolError::InvalidWorkbook(format!("no worksheet part for relationship '{r_id}'"))
    })?;
    scan_blanks(archive.by_name(sheet_path)?)
}

fn first_sheet_rel_id<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> Result<Option<String>> {
    let file = archive.by_name("xl/workbook.xml")?;
    let mut xml_reader = Reader::from_reader(BufReader::new(file));
    xml_reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"sheet" => {
                return Ok(attribute(&e, b"r:id"));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

fn worksheet_targets<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<HashMap<String, String>> {
    let file = archive.by_name("xl/_rels/workbook.xml.rels")?;
    let mut xml_reader = Reader::from_reader(BufReader::new(file));
    xml_reader.trim_text(true);
    let mut buf = Vec::new();
    let mut rels = HashMap::new();

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                let id = attribute(&e, b"Id");
                let target = attribute(&e, b"Target");
                let is_worksheet = attribute(&e, b"Type")
                    .is_some_and(|rel_type| rel_type.ends_with("/worksheet"));
                if let (Some(id), Some(target), true) = (id, target, is_worksheet) {
                    let full_path = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("xl/{target}"),
                    };
                    rels.insert(id, full_path);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

fn scan_blanks<R: Read>(sheet_xml: R) -> Result<Vec<(RowIndex, ColIndex)>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(sheet_xml));
    xml_reader.trim_text(true);
    let mut buf = Vec::new();
    let mut blanks = Vec::new();
    // Open `<c>` element and whether a value child was seen inside it.
    let mut open_cell: Option<(Option<(RowIndex, ColIndex)>, bool)> = None;

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                if let Some(position) = cell_position(&e) {
                    blanks.push(position);
                }
            }
            Event::Start(e) if e.local_name().as_ref() == b"c" => {
                open_cell = Some((cell_position(&e), false));
            }
            Event::Start(e) | Event::Empty(e)
                if matches!(e.local_name().as_ref(), b"v" | b"f" | b"is") =>
            {
                if let Some((_, has_value)) = open_cell.as_mut() {
                    *has_value = true;
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"c" => {
                if let Some((Some(position), false)) = open_cell.take() {
                    blanks.push(position);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(blanks)
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|value| value.to_string()))
}

fn cell_position(element: &BytesStart<'_>) -> Option<(RowIndex, ColIndex)> {
    attribute(element, b"r").and_then(|reference| parse_cell_ref(&reference))
}

/// Parses an A1-style reference into zero-based row and column.
fn parse_cell_ref(reference: &str) -> Option<(RowIndex, ColIndex)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }

    let mut col: u32 = 0;
    for byte in letters.bytes() {
        col = col
            .checked_mul(26)?
            .checked_add(u32::from(byte.to_ascii_uppercase() - b'A') + 1)?;
    }
    let row: u32 = digits.parse().ok()?;
    let col = ColIndex::try_from(col - 1).ok()?;
    Some((row.checked_sub(1)?, col))
}
