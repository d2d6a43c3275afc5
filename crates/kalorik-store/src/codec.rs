//! Submission codec: table + annotation <-> two byte blobs.
//!
//! The table is stored as UTF-8 CSV with a byte-order mark and a header row;
//! the annotation is stored as plain UTF-8 text. Decoding never fails the whole
//! load: see [`decode_table`] and [`decode_annotation`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{StoreError, StoreResult};

/// UTF-8 byte-order mark written in front of every table.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A loosely typed table cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Infer a cell from its textual form.
    pub fn infer(field: &str) -> Self {
        if field.is_empty() {
            return Self::Empty;
        }
        match field.parse::<f64>() {
            Ok(n) if !n.is_nan() => Self::Number(n),
            _ => Self::Text(field.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Number(n) if n.is_nan() => Ok(()),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

/// Ordered rows under named columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Table with the given columns and no rows.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Caller guarantees every row matches the column count.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    /// Append a row; its width must match the column count.
    pub fn push_row(&mut self, row: Vec<CellValue>) -> StoreResult<()> {
        if row.len() != self.columns.len() {
            return Err(StoreError::Codec {
                message: format!(
                    "row has {} cells but table has {} columns",
                    row.len(),
                    self.columns.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builder form of [`Table::push_row`].
    pub fn with_row(mut self, row: Vec<CellValue>) -> StoreResult<Self> {
        self.push_row(row)?;
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True without columns or without rows.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &CellValue> + '_> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }
}

/// One group's results for one station.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Submission {
    pub table: Table,
    pub annotation: String,
}

impl Submission {
    pub fn new(table: Table, annotation: impl Into<String>) -> Self {
        Self {
            table,
            annotation: annotation.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty() && self.annotation.is_empty()
    }
}

/// Serialize a table as BOM-prefixed CSV.
pub fn encode_table(table: &Table) -> StoreResult<Vec<u8>> {
    let mut out = UTF8_BOM.to_vec();
    if table.columns.is_empty() {
        return Ok(out);
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(&mut out);

    writer.write_record(&table.columns).map_err(codec_error)?;
    for row in &table.rows {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .map_err(codec_error)?;
    }
    writer.flush().map_err(|e| StoreError::Codec {
        message: e.to_string(),
    })?;
    drop(writer);

    Ok(out)
}

/// Parse CSV bytes, failing on malformed input.
pub fn try_decode_table(bytes: &[u8]) -> StoreResult<Table> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.is_empty() {
        return Ok(Table::default());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .map_err(codec_error)?
        .iter()
        .map(String::from)
        .collect();
    let mut table = Table::new(columns);

    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(codec_error)?;
        if record.len() > table.columns.len() {
            return Err(StoreError::Codec {
                message: format!(
                    "row {} has {} fields but header has {}",
                    line + 1,
                    record.len(),
                    table.columns.len()
                ),
            });
        }
        let mut row: Vec<CellValue> = record.iter().map(CellValue::infer).collect();
        row.resize(table.columns.len(), CellValue::Empty);
        table.rows.push(row);
    }

    Ok(table)
}

/// Parse CSV bytes; malformed input yields an empty table.
pub fn decode_table(bytes: &[u8]) -> Table {
    try_decode_table(bytes).unwrap_or_else(|e| {
        warn!(error = %e, "stored table is malformed, using empty table");
        Table::default()
    })
}

pub fn encode_annotation(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn decode_annotation(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn codec_error(err: csv::Error) -> StoreError {
    StoreError::Codec {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn bar_table() -> Table {
        Table::new(["Kategorie", "Temperatur [°C]", "Bemerkung"])
            .with_row(vec!["Kupfer".into(), 48.5.into(), "schnell, warm".into()])
            .unwrap()
            .with_row(vec!["Holz".into(), 23.0.into(), CellValue::Empty])
            .unwrap()
    }

    #[test]
    fn test_encode_layout() {
        let bytes = encode_table(&bar_table()).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&bytes[3..]).unwrap();
        assert_eq!(
            text,
            "Kategorie,Temperatur [°C],Bemerkung\nKupfer,48.5,\"schnell, warm\"\nHolz,23,\n"
        );
    }

    #[test]
    fn test_round_trip() {
        let table = bar_table();
        let decoded = decode_table(&encode_table(&table).unwrap());
        assert_eq!(decoded, table);

        let annotation = "Kupfer leitet Wärme am besten.\n\nZweite Zeile";
        assert_eq!(decode_annotation(&encode_annotation(annotation)), annotation);
    }

    #[test]
    fn test_numeric_text_coerced() {
        let table = Table::new(["Zeit [min]"])
            .with_row(vec![CellValue::Text("5".into())])
            .unwrap();
        let decoded = decode_table(&encode_table(&table).unwrap());
        assert_eq!(decoded.rows()[0][0], CellValue::Number(5.0));
    }

    #[test]
    fn test_header_only_table() {
        let table = Table::new(["Zeit [min]", "Bemerkung"]);
        let decoded = decode_table(&encode_table(&table).unwrap());
        assert_eq!(decoded.columns(), table.columns());
        assert_eq!(decoded.row_count(), 0);
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_single_empty_cell_row_survives() {
        let table = Table::new(["Bemerkung"])
            .with_row(vec![CellValue::Empty])
            .unwrap();
        let decoded = decode_table(&encode_table(&table).unwrap());
        assert_eq!(decoded, table);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(decode_table(b""), Table::default());
        assert_eq!(decode_table(UTF8_BOM), Table::default());
        assert_eq!(encode_table(&Table::default()).unwrap(), UTF8_BOM);
    }

    #[test]
    fn test_without_bom_and_crlf() {
        let decoded = decode_table(b"a,b\r\n1,x\r\n");
        assert_eq!(decoded.columns(), ["a", "b"]);
        assert_eq!(
            decoded.rows()[0],
            vec![CellValue::Number(1.0), CellValue::Text("x".into())]
        );
    }

    #[test]
    fn test_short_rows_padded() {
        let decoded = decode_table(b"a,b,c\n1\n");
        assert_eq!(
            decoded.rows()[0],
            vec![CellValue::Number(1.0), CellValue::Empty, CellValue::Empty]
        );
    }

    #[test]
    fn test_malformed_is_tolerated() {
        let bytes = b"a,b\n1,2,3\n";
        assert!(matches!(try_decode_table(bytes), Err(StoreError::Codec { .. })));
        assert_eq!(decode_table(bytes), Table::default());
        assert_eq!(decode_table(b"a,b\n\xff\xfe,1\n"), Table::default());
    }

    #[test]
    fn test_nan_written_empty_and_text_nan_kept() {
        let table = Table::new(["x"])
            .with_row(vec![CellValue::Number(f64::NAN)])
            .unwrap();
        let text = encode_table(&table).unwrap();
        assert_eq!(&text[3..], b"x\n\"\"\n");
        assert_eq!(CellValue::infer("NaN"), CellValue::Text("NaN".into()));
    }

    #[test]
    fn test_push_row_width_checked() {
        let mut table = Table::new(["a", "b"]);
        assert!(table.push_row(vec![CellValue::Empty]).is_err());
    }

    #[test]
    fn test_column_access() {
        let table = bar_table();
        let temps: Vec<f64> = table
            .column("Temperatur [°C]")
            .unwrap()
            .filter_map(CellValue::as_number)
            .collect();
        assert_eq!(temps, vec![48.5, 23.0]);
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_annotation_lossy() {
        assert_eq!(decode_annotation(b"ok \xff"), "ok \u{FFFD}");
        assert_eq!(decode_annotation(b""), "");
    }

    #[test]
    fn test_cell_json_shape() {
        let row = vec![CellValue::Empty, 2.5.into(), "x".into()];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"[null,2.5,"x"]"#);
        let back: Vec<CellValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_whitespace_only_table_survives() {
        let header_only = Table::new([" "]);
        assert_eq!(decode_table(&encode_table(&header_only).unwrap()), header_only);

        let blank_cell = Table::new([" "])
            .with_row(vec![CellValue::Text(" ".into())])
            .unwrap();
        let decoded = decode_table(&encode_table(&blank_cell).unwrap());
        assert_eq!(decoded.row_count(), 1);
        assert_eq!(decoded, blank_cell);
    }

    fn cell() -> impl Strategy<Value = CellValue> {
        prop_oneof![
            Just(CellValue::Empty),
            (-1.0e9f64..1.0e9).prop_map(CellValue::Number),
            "[a-zA-Z0-9 äöüß\"',;\r\n.-]{1,8}".prop_filter_map("reads back as a number", |s| {
                match CellValue::infer(&s) {
                    text @ CellValue::Text(_) => Some(text),
                    _ => None,
                }
            }),
        ]
    }

    fn table() -> impl Strategy<Value = Table> {
        (1usize..5)
            .prop_flat_map(|width| {
                (
                    prop::collection::vec("[a-zA-Z0-9 äöü\"',;\r\n.°\\[\\]-]{0,8}", width),
                    prop::collection::vec(prop::collection::vec(cell(), width), 0..6),
                )
            })
            .prop_map(|(columns, rows)| Table::from_parts(columns, rows))
    }

    proptest! {
        #[test]
        fn prop_table_round_trip(table in table()) {
            let bytes = encode_table(&table).unwrap();
            prop_assert_eq!(try_decode_table(&bytes).unwrap(), table);
        }
    }
}
