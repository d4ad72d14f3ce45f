use csv::{ReaderBuilder, Terminator, Trim, WriterBuilder};

use crate::export::ExportError;

/// Renames the header cell `column` to `key`, leaving every data line
/// untouched. Used to prepare spreadsheets whose region column carries a
/// different label. Returns `None` when the header has no such column.
pub fn rekey_header(text: &str, column: &str, key: &str) -> Result<Option<String>, ExportError> {
    let body = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut head_end = body.find('\n').unwrap_or(body.len());
    if body[..head_end].ends_with('\r') {
        head_end -= 1;
    }
    let (head, rest) = body.split_at(head_end);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .from_reader(head.as_bytes());
    let Some(record) = reader.records().next().transpose()? else {
        return Ok(None);
    };
    if !record.iter().any(|h| h == column) {
        return Ok(None);
    }

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(record.iter().map(|h| if h == column { key } else { h }))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    let mut out = String::from_utf8(bytes)?;
    out.pop();
    out.push_str(rest);
    Ok(Some(out))
}

#[cfg(test)]
mod tests {
    use super::rekey_header;

    #[test]
    fn renames_only_the_header_cell() {
        let out = rekey_header("地区,GDP\n地区A,1\n", "地区", "城市").unwrap();
        assert_eq!(out.as_deref(), Some("城市,GDP\n地区A,1\n"));
    }

    #[test]
    fn keeps_crlf_body_and_handles_header_only_text() {
        let out = rekey_header("name,GDP\r\nx,1\r\n", "name", "城市").unwrap();
        assert_eq!(out.as_deref(), Some("城市,GDP\r\nx,1\r\n"));
        let out = rekey_header("name,GDP", "name", "城市").unwrap();
        assert_eq!(out.as_deref(), Some("城市,GDP"));
    }

    #[test]
    fn missing_column_is_none() {
        assert_eq!(rekey_header("a,b\n1,2\n", "城市", "城市").unwrap(), None);
        assert_eq!(rekey_header("", "城市", "城市").unwrap(), None);
    }
}
