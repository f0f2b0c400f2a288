use std::{collections::HashMap, fs, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::SHIFT_JIS;
use tracing::{debug, warn};

use crate::estat::{
    error::EstatError,
    value::{FieldKind, Value},
};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 列名と列の日本語名の2行
const HEADER_LINES: u64 = 2;

/// 読み込んだ統計表。行は KEY_CODE で引ける。
///
/// 同じ KEY_CODE の行が複数あった場合は後の行で上書きし（位置は最初の行のまま）、上書きした数を数えておく。
#[derive(Debug, Clone)]
pub struct EstatTable {
    columns: Vec<String>,
    aliases: Vec<String>,
    kinds: Vec<FieldKind>,
    key_column: usize,
    records: Vec<Vec<Value>>,
    index: HashMap<String, usize>,
    duplicates: usize,
}

impl EstatTable {
    /// Shift_JIS の CSV ファイルを読み込む。
    pub fn read_path(path: impl AsRef<Path>) -> Result<EstatTable, EstatError> {
        let bytes = fs::read(path.as_ref())?;
        debug!(path = %path.as_ref().display(), bytes = bytes.len(), "read e-Stat CSV");
        Self::read_bytes(&bytes)
    }

    /// Shift_JIS のバイト列を読み込む。
    pub fn read_bytes(bytes: &[u8]) -> Result<EstatTable, EstatError> {
        let text = decode_shift_jis(bytes)?;
        Self::read_str(&text)
    }

    /// デコード済みの文字列を読み込む。
    ///
    /// 先頭の2行（列名と列の日本語名）は物理行として切り出す。空の2行目も1列分の見出しとして扱う。
    pub fn read_str(text: &str) -> Result<EstatTable, EstatError> {
        let (first, rest) = next_line(text).ok_or(EstatError::MissingHeader)?;
        let (second, body) = next_line(rest).ok_or(EstatError::MissingHeader)?;

        let columns = parse_header(first)?;
        let aliases = parse_header(second)?;
        if columns.len() != aliases.len() {
            return Err(EstatError::HeaderMismatch {
                names: columns.len(),
                aliases: aliases.len(),
            });
        }
        let key_column = columns
            .iter()
            .position(|c| c == "KEY_CODE")
            .ok_or(EstatError::MissingKeyCodeColumn)?;
        let kinds: Vec<FieldKind> = columns.iter().map(|c| FieldKind::of_column(c)).collect();

        let mut table = EstatTable {
            columns,
            aliases,
            kinds,
            key_column,
            records: Vec::new(),
            index: HashMap::new(),
            duplicates: 0,
        };
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(body.as_bytes());
        for row in reader.records() {
            let row = row?;
            //見出しの2行を飛ばした分を足して、ファイル上の行番号にする
            let line = row.position().map_or(0, |p| p.line()) + HEADER_LINES;
            table.push_row(&row, line)?;
        }
        debug!(
            rows = table.records.len(),
            duplicates = table.duplicates,
            "scanned e-Stat table"
        );
        Ok(table)
    }

    fn push_row(&mut self, row: &StringRecord, line: u64) -> Result<(), EstatError> {
        if row.len() != self.columns.len() {
            return Err(EstatError::RowFieldCount {
                line,
                expected: self.columns.len(),
                found: row.len(),
            });
        }

        let mut values = Vec::with_capacity(row.len());
        for (i, field) in row.iter().enumerate() {
            let value = if field.is_empty() || field == "*" {
                Value::Null
            } else {
                match self.kinds[i] {
                    FieldKind::Text => Value::Text(field.to_string()),
                    FieldKind::Integer => {
                        let v = field.parse::<i64>().map_err(|_| EstatError::InvalidInteger {
                            line,
                            column: self.columns[i].clone(),
                            value: field.to_string(),
                        })?;
                        Value::Integer(v)
                    }
                }
            };
            values.push(value);
        }

        let key = match &values[self.key_column] {
            Value::Text(key) => key.clone(),
            _ => return Err(EstatError::MissingKeyCode { line }),
        };
        match self.index.get(&key) {
            Some(&at) => {
                warn!(key = %key, line, "duplicate KEY_CODE; the later row replaces the earlier one");
                self.duplicates += 1;
                self.records[at] = values;
            }
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(values);
            }
        }
        Ok(())
    }

    /// 列名（1行目）
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// 列の日本語名（2行目）。空文字列のこともある。
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn kinds(&self) -> &[FieldKind] {
        &self.kinds
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn key_column(&self) -> usize {
        self.key_column
    }

    /// 最初に現れた順の行
    pub fn records(&self) -> &[Vec<Value>] {
        &self.records
    }

    pub fn get(&self, key: &str) -> Option<&[Value]> {
        self.index.get(key).map(|&i| self.records[i].as_slice())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 後の行で上書きされた KEY_CODE の数
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// 先頭の1行と残りに分ける。文字列が空なら行はない。
fn next_line(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    Some(text.split_once('\n').unwrap_or((text, "")))
}

/// 見出しの1行を列の並びにする。空行は空文字列1列とみなす。
fn parse_header(line: &str) -> Result<Vec<String>, EstatError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .from_reader(line.as_bytes());
    match reader.records().next() {
        Some(row) => Ok(row?.iter().map(str::to_string).collect()),
        None => Ok(vec![String::new()]),
    }
}

/// Shift_JIS として厳密にデコードする。
///
/// BOM 付きの UTF-8 や、Shift_JIS として不正なバイト列、非 ASCII 文字を含む正しい UTF-8 は
/// 別の文字コードで保存されたファイルとみなして [`EstatError::Encoding`] を返す。
fn decode_shift_jis(bytes: &[u8]) -> Result<String, EstatError> {
    if bytes.starts_with(UTF8_BOM) {
        return Err(EstatError::Encoding);
    }
    if !bytes.is_ascii() && std::str::from_utf8(bytes).is_ok() {
        return Err(EstatError::Encoding);
    }
    SHIFT_JIS
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or(EstatError::Encoding)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// テスト用に UTF-8 の文字列を Shift_JIS に変換する。
    pub(crate) fn sjis(text: &str) -> Vec<u8> {
        let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
        assert!(!had_errors);
        bytes.into_owned()
    }

    const HEADER: &str = "KEY_CODE,HTKSYORI,HTKSAKI,GASSAN,T000847001\n,,,,人口（総数）\n";

    #[test]
    fn read_basic_table() {
        let csv = format!("{HEADER}53394611, 0 ,,,100\n53394612,1,,53394613,*\n");
        let table = EstatTable::read_bytes(&sjis(&csv)).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.aliases()[4], "人口（総数）");
        let row = table.get("53394611").unwrap();
        assert_eq!(row[1], Value::Integer(0));
        assert_eq!(row[2], Value::Null);
        assert_eq!(row[4], Value::Integer(100));
        let row = table.get("53394612").unwrap();
        assert_eq!(row[3], Value::Text("53394613".into()));
        assert_eq!(row[4], Value::Null);
    }

    #[test]
    fn utf8_input_is_an_encoding_error() {
        let csv = format!("{HEADER}53394611,0,,,100\n");
        assert!(matches!(
            EstatTable::read_bytes(csv.as_bytes()),
            Err(EstatError::Encoding)
        ));

        let mut with_bom = UTF8_BOM.to_vec();
        with_bom.extend_from_slice(b"KEY_CODE\n\n");
        assert!(matches!(
            EstatTable::read_bytes(&with_bom),
            Err(EstatError::Encoding)
        ));
    }

    #[test]
    fn broken_shift_jis_is_an_encoding_error() {
        let mut bytes = sjis(HEADER);
        bytes.extend_from_slice(b"53394611,\x82\n");
        assert!(matches!(
            EstatTable::read_bytes(&bytes),
            Err(EstatError::Encoding)
        ));
    }

    #[test]
    fn header_length_mismatch() {
        let result = EstatTable::read_str("KEY_CODE,T1,T2\n,人口\n");
        assert!(matches!(
            result,
            Err(EstatError::HeaderMismatch {
                names: 3,
                aliases: 2
            })
        ));
    }

    #[test]
    fn row_length_mismatch() {
        let result = EstatTable::read_str(&format!("{HEADER}53394611,0,,\n"));
        assert!(matches!(
            result,
            Err(EstatError::RowFieldCount {
                line: 3,
                expected: 5,
                found: 4
            })
        ));
    }

    #[test]
    fn blank_alias_line_is_a_header_mismatch() {
        let result = EstatTable::read_str("KEY_CODE,T1\n\n53394611,5\n53394612,7\n");
        assert!(matches!(
            result,
            Err(EstatError::HeaderMismatch {
                names: 2,
                aliases: 1
            })
        ));

        let result = EstatTable::read_str("KEY_CODE,T1\r\n\r\n53394611,5\r\n");
        assert!(matches!(result, Err(EstatError::HeaderMismatch { .. })));
    }

    #[test]
    fn blank_alias_line_for_a_single_column() {
        let table = EstatTable::read_str("KEY_CODE\n\n53394611\n53394612\n").unwrap();
        assert_eq!(table.aliases(), [String::new()]);
        assert_eq!(table.len(), 2);
        assert!(table.get("53394611").is_some());
    }

    #[test]
    fn missing_key_code_column() {
        let result = EstatTable::read_str("CODE,T1\n,\n1,2\n");
        assert!(matches!(result, Err(EstatError::MissingKeyCodeColumn)));
    }

    #[test]
    fn missing_header() {
        assert!(matches!(
            EstatTable::read_str("KEY_CODE\n"),
            Err(EstatError::MissingHeader)
        ));
    }

    #[test]
    fn empty_key_code() {
        let result = EstatTable::read_str(&format!("{HEADER},0,,,1\n"));
        assert!(matches!(result, Err(EstatError::MissingKeyCode { line: 3 })));
    }

    #[test]
    fn invalid_integer() {
        let result = EstatTable::read_str(&format!("{HEADER}53394611,0,,,abc\n"));
        match result {
            Err(EstatError::InvalidInteger { column, value, .. }) => {
                assert_eq!(column, "T000847001");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn duplicate_key_keeps_position_and_last_values() {
        let csv = format!("{HEADER}53394611,0,,,1\n53394612,0,,,2\n53394611,0,,,3\n");
        let table = EstatTable::read_str(&csv).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.duplicates(), 1);
        assert_eq!(table.records()[0][4], Value::Integer(3));
        assert_eq!(table.records()[1][4], Value::Integer(2));
    }
}
