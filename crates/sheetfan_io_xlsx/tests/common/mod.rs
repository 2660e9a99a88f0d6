//! Minimal XLSX read-back helpers for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// One cell as stored on disk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadCell {
    /// Resolved text (`<v>` content or shared/inline string).
    pub text: String,
    /// Cell type attribute (`s`, `inlineStr`, ... or empty for numbers).
    pub cell_type: String,
    /// Number format code resolved through the style index.
    pub num_format: Option<String>,
}

/// One worksheet read back from disk.
#[derive(Debug, Clone, Default)]
pub struct ReadSheet {
    pub name: String,
    pub cells: BTreeMap<(u32, u16), ReadCell>,
    pub xml: String,
}

impl ReadSheet {
    /// Number of distinct rows holding at least one cell.
    pub fn row_count(&self) -> usize {
        let mut l_rows: Vec<u32> = self.cells.keys().map(|(row, _)| *row).collect();
        l_rows.dedup();
        l_rows.len()
    }

    /// Whether a `<c>` element exists for the cell.
    pub fn has_cell(&self, row: u32, col: u16) -> bool {
        self.cells.contains_key(&(row, col))
    }

    /// Cell text; missing cells read as empty strings.
    pub fn text(&self, row: u32, col: u16) -> String {
        self.cells
            .get(&(row, col))
            .map(|cell| cell.text.clone())
            .unwrap_or_default()
    }

    /// Number format of a cell.
    pub fn num_format(&self, row: u32, col: u16) -> Option<String> {
        self.cells
            .get(&(row, col))
            .and_then(|cell| cell.num_format.clone())
    }

    /// Cell values as a `(row, col) -> text` map.
    pub fn values(&self) -> BTreeMap<(u32, u16), String> {
        self.cells
            .iter()
            .map(|(key, cell)| (*key, cell.text.clone()))
            .collect()
    }
}

/// Read every worksheet of `path` in workbook order.
pub fn read_workbook(path: &Path) -> Vec<ReadSheet> {
    let mut archive = zip::ZipArchive::new(File::open(path).expect("open xlsx")).expect("zip");
    let mut read_part = |name: &str| -> Option<String> {
        let mut entry = archive.by_name(name).ok()?;
        let mut txt = String::new();
        entry.read_to_string(&mut txt).expect("read part");
        Some(txt)
    };

    let xml_workbook = read_part("xl/workbook.xml").expect("workbook.xml");
    let l_shared = read_part("xl/sharedStrings.xml")
        .map(|xml| parse_shared_strings(&xml))
        .unwrap_or_default();
    let l_style_formats = read_part("xl/styles.xml")
        .map(|xml| parse_style_formats(&xml))
        .unwrap_or_default();

    parse_sheet_names(&xml_workbook)
        .into_iter()
        .enumerate()
        .map(|(n_idx, name)| {
            let xml = read_part(&format!("xl/worksheets/sheet{}.xml", n_idx + 1))
                .expect("worksheet part");
            let cells = parse_sheet_cells(&xml, &l_shared, &l_style_formats);
            ReadSheet { name, cells, xml }
        })
        .collect()
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(Result::ok)
        .find(|a| a.key.as_ref() == key)
        .map(|a| a.unescape_value().expect("attr").into_owned())
}

fn parse_sheet_names(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut l_names = Vec::new();
    loop {
        match reader.read_event().expect("workbook xml") {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"sheet" => {
                l_names.push(attr(&e, b"name").expect("sheet name"));
            }
            Event::Eof => break,
            _ => {}
        }
    }
    l_names
}

fn parse_shared_strings(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut l_strings = Vec::new();
    let mut if_in_t = false;
    loop {
        match reader.read_event().expect("shared strings xml") {
            Event::Start(e) if e.name().as_ref() == b"si" => l_strings.push(String::new()),
            Event::Start(e) if e.name().as_ref() == b"t" => if_in_t = true,
            Event::End(e) if e.name().as_ref() == b"t" => if_in_t = false,
            Event::Text(e) if if_in_t => {
                if let Some(last) = l_strings.last_mut() {
                    last.push_str(&e.unescape().expect("text"));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    l_strings
}

/// Map `cellXfs` index to number format code.
fn parse_style_formats(xml: &str) -> Vec<Option<String>> {
    let mut reader = Reader::from_str(xml);
    let mut dict_num_formats: BTreeMap<u32, String> = BTreeMap::new();
    dict_num_formats.insert(14, "m/d/yyyy".to_string());
    dict_num_formats.insert(49, "@".to_string());
    let mut l_xf_num_fmt_ids = Vec::new();
    let mut if_in_cell_xfs = false;
    loop {
        match reader.read_event().expect("styles xml") {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"numFmt" => {
                let n_id: u32 = attr(&e, b"numFmtId").expect("id").parse().expect("id");
                dict_num_formats.insert(n_id, attr(&e, b"formatCode").expect("code"));
            }
            Event::Start(e) if e.name().as_ref() == b"cellXfs" => if_in_cell_xfs = true,
            Event::End(e) if e.name().as_ref() == b"cellXfs" => if_in_cell_xfs = false,
            Event::Start(e) | Event::Empty(e)
                if if_in_cell_xfs && e.name().as_ref() == b"xf" =>
            {
                let n_id: u32 = attr(&e, b"numFmtId")
                    .map(|v| v.parse().expect("id"))
                    .unwrap_or(0);
                l_xf_num_fmt_ids.push(n_id);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    l_xf_num_fmt_ids
        .into_iter()
        .map(|n_id| dict_num_formats.get(&n_id).cloned())
        .collect()
}

fn parse_cell_ref(c_ref: &str) -> (u32, u16) {
    let n_split = c_ref
        .find(|c: char| c.is_ascii_digit())
        .expect("cell ref row");
    let col = c_ref[..n_split]
        .bytes()
        .fold(0u16, |acc, b| acc * 26 + (b - b'A' + 1) as u16)
        - 1;
    let row: u32 = c_ref[n_split..].parse().expect("row");
    (row - 1, col)
}

fn parse_cell_start(
    e: &BytesStart<'_>,
    l_style_formats: &[Option<String>],
) -> ((u32, u16), ReadCell) {
    let key = parse_cell_ref(&attr(e, b"r").expect("cell ref"));
    let num_format = attr(e, b"s")
        .and_then(|v| v.parse::<usize>().ok())
        .and_then(|n_idx| l_style_formats.get(n_idx).cloned().flatten());
    let cell = ReadCell {
        cell_type: attr(e, b"t").unwrap_or_default(),
        num_format,
        ..Default::default()
    };
    (key, cell)
}

fn parse_sheet_cells(
    xml: &str,
    l_shared: &[String],
    l_style_formats: &[Option<String>],
) -> BTreeMap<(u32, u16), ReadCell> {
    let mut reader = Reader::from_str(xml);
    let mut dict_cells = BTreeMap::new();
    let mut current: Option<((u32, u16), ReadCell)> = None;
    let mut if_in_value = false;
    loop {
        match reader.read_event().expect("sheet xml") {
            Event::Empty(e) if e.name().as_ref() == b"c" => {
                let (key, cell) = parse_cell_start(&e, l_style_formats);
                dict_cells.insert(key, cell);
            }
            Event::Start(e) if e.name().as_ref() == b"c" => {
                current = Some(parse_cell_start(&e, l_style_formats));
            }
            Event::Start(e) if matches!(e.name().as_ref(), b"v" | b"t") => if_in_value = true,
            Event::End(e) if matches!(e.name().as_ref(), b"v" | b"t") => if_in_value = false,
            Event::Text(e) if if_in_value => {
                if let Some((_, cell)) = current.as_mut() {
                    cell.text.push_str(&e.unescape().expect("text"));
                }
            }
            Event::End(e) if e.name().as_ref() == b"c" => {
                if let Some((key, mut cell)) = current.take() {
                    if cell.cell_type == "s" {
                        let n_idx: usize = cell.text.parse().expect("shared index");
                        cell.text = l_shared[n_idx].clone();
                    }
                    dict_cells.insert(key, cell);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    dict_cells
}
