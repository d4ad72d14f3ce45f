use std::collections::BTreeMap;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One user-supplied CSV file, already decoded as UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("文件 {file} 必须包含{key}列")]
    MissingKeyColumn { file: String, key: String },
    #[error("文件 {file} 解析失败: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
}

/// A field -> value mapping. Fields absent from the row's source file are
/// simply missing; an empty cell is present with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    fields: BTreeMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Value for display purposes: empty cells count as missing.
    pub fn non_empty(&self, field: &str) -> Option<&str> {
        self.get(field).filter(|v| !v.is_empty())
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Numeric reading of the field, see [`parse_number`].
    pub fn number(&self, field: &str) -> Option<f64> {
        parse_number(self.get(field)?)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Numeric reading of a cell: the longest leading decimal literal after
/// leading whitespace, so `"12%"` reads 12 and `"100万"` reads 100. Only the
/// spelled-out `Infinity` is infinite; `inf`, `NaN` and text without a
/// leading number read as `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let literal = &text[..numeric_prefix_len(text)];
    if literal.is_empty() {
        return None;
    }
    literal.parse().ok()
}

fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if text[end..].starts_with("Infinity") {
        return end + "Infinity".len();
    }

    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };
    let int_digits = digits_from(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return 0;
    }

    // The exponent only counts when at least one digit follows it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits_from(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }
    end
}

/// The merged in-memory table.
///
/// Ordering contract:
/// - Rows keep file order, then line order within each file.
/// - Headers are the union of all file headers in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        let mut table = Table::default();
        table.extend_headers(headers);
        table.rows = rows;
        table
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_header(&self, field: &str) -> bool {
        self.headers.iter().any(|h| h == field)
    }

    /// Headers other than the join key, in header order.
    pub fn data_headers<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .map(String::as_str)
            .filter(move |h| *h != key)
    }

    /// First row whose key column equals `value`.
    pub fn find_by_key(&self, key: &str, value: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.get(key) == Some(value))
    }

    fn extend_headers(&mut self, headers: impl IntoIterator<Item = String>) {
        for h in headers {
            if !self.has_header(&h) {
                self.headers.push(h);
            }
        }
    }
}

/// Combines every file into one table joined on `key`.
///
/// All-or-nothing: if any file lacks the key column the whole merge fails and
/// no partial table is produced.
pub fn merge(files: &[SourceFile], key: &str) -> Result<Table, MergeError> {
    let mut table = Table::default();
    for file in files {
        let (headers, rows) = parse_file(file, key)?;
        tracing::debug!(file = %file.name, rows = rows.len(), "parsed csv file");
        table.extend_headers(headers);
        table.rows.extend(rows);
    }
    Ok(table)
}

fn parse_file(file: &SourceFile, key: &str) -> Result<(Vec<String>, Vec<Row>), MergeError> {
    let text = file.text.strip_prefix('\u{feff}').unwrap_or(&file.text);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let csv_err = |source: csv::Error| MergeError::Csv {
        file: file.name.clone(),
        source,
    };

    let mut records = reader.records();
    let headers: Vec<String> = loop {
        match records.next() {
            Some(rec) => {
                let rec = rec.map_err(csv_err)?;
                if !is_blank(&rec) {
                    break rec.iter().map(str::to_string).collect();
                }
            }
            None => break Vec::new(),
        }
    };

    if !headers.iter().any(|h| h == key) {
        return Err(MergeError::MissingKeyColumn {
            file: file.name.clone(),
            key: key.to_string(),
        });
    }

    let mut rows: Vec<Row> = Vec::new();
    for rec in records {
        let rec = rec.map_err(csv_err)?;
        if is_blank(&rec) {
            continue;
        }
        // Positional zip: extra values are dropped, missing ones stay absent.
        rows.push(headers.iter().cloned().zip(rec.iter()).collect());
    }
    Ok((headers, rows))
}

/// A line with nothing but whitespace. Lines of bare delimiters such as
/// `,,` are rows of empty cells and are kept.
fn is_blank(rec: &StringRecord) -> bool {
    rec.len() == 1 && rec.get(0).is_some_and(str::is_empty)
}
