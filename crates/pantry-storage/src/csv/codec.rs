//! Delimited-text encoding and decoding.
//!
//! First row = column headers, one row per record. Fields are quoted
//! when they contain the delimiter, a quote, or a line break; embedded
//! quotes are doubled. `encode(decode(x))` reproduces byte-for-byte
//! equivalent rows for the same column order and values.

use pantry_common::{PantryError, PantryResult, Row, Table, Value};

/// Encodes a table as delimited text, header row first.
pub fn encode(table: &Table) -> String {
    let mut output = String::new();

    let header: Vec<String> = table.columns().iter().map(|c| escape(c)).collect();
    output.push_str(&header.join(","));
    output.push('\n');

    for row in table.rows() {
        let fields: Vec<String> = row.iter().map(|v| escape(&v.to_field())).collect();
        output.push_str(&fields.join(","));
        output.push('\n');
    }

    output
}

/// Decodes delimited text into a table.
///
/// Empty input decodes to a table with no columns and no rows. Blank
/// lines are skipped. A record whose width differs from the header is a
/// [`PantryError::SchemaMismatch`].
pub fn decode(content: &str) -> PantryResult<Table> {
    let records = parse_records(content)?;
    let mut records = records.into_iter();

    let Some(header) = records.next() else {
        return Ok(Table::empty(Vec::new()));
    };

    let mut table = Table::empty(header);
    for record in records {
        let values = record.iter().map(|f| Value::infer(f)).collect();
        table.push_row(Row::new(values))?;
    }
    Ok(table)
}

/// Escapes a single field.
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Splits content into records of raw fields, honoring quoting.
fn parse_records(content: &str) -> PantryResult<Vec<Vec<String>>> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_quoted = false;

    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !field_quoted => {
                in_quotes = true;
                field_quoted = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                field_quoted = false;
            }
            '\n' => {
                if !field_quoted && field.ends_with('\r') {
                    field.pop();
                }
                record.push(std::mem::take(&mut field));
                field_quoted = false;
                if !(record.len() == 1 && record[0].is_empty()) {
                    records.push(std::mem::take(&mut record));
                } else {
                    record.clear();
                }
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(PantryError::invalid_config(
            "unterminated quoted field in delimited text",
        ));
    }

    if !field.is_empty() || field_quoted || !record.is_empty() {
        record.push(field);
        if !(record.len() == 1 && record[0].is_empty()) {
            records.push(record);
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_table() -> Table {
        let mut table = Table::empty(vec![
            "Claim_ID".into(),
            "Food_ID".into(),
            "Status".into(),
        ]);
        table
            .push_row(Row::new(vec![
                Value::Integer(1),
                Value::Integer(10),
                Value::text("Pending"),
            ]))
            .unwrap();
        table
            .push_row(Row::new(vec![
                Value::Integer(2),
                Value::Integer(11),
                Value::text("Completed"),
            ]))
            .unwrap();
        table
    }

    #[test]
    fn test_encode_header_and_rows() {
        let encoded = encode(&claims_table());
        assert_eq!(
            encoded,
            "Claim_ID,Food_ID,Status\n1,10,Pending\n2,11,Completed\n"
        );
    }

    #[test]
    fn test_round_trip_plain() {
        let table = claims_table();
        let decoded = decode(&encode(&table)).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn test_round_trip_empty_table() {
        let table = Table::empty(vec!["A".into(), "B".into()]);
        let decoded = decode(&encode(&table)).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn test_round_trip_special_characters() {
        let mut table = Table::empty(vec!["Name".into(), "Address".into()]);
        table
            .push_row(Row::new(vec![
                Value::text("Baker, Sons \"&\" Co"),
                Value::text("12 High St\nSpringfield"),
            ]))
            .unwrap();

        let encoded = encode(&table);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, table);
        // And the second pass is byte-identical.
        assert_eq!(encode(&decoded), encoded);
    }

    #[test]
    fn test_decode_empty_input() {
        let table = decode("").unwrap();
        assert_eq!(table.num_columns(), 0);
        assert_eq!(table.num_rows(), 0);
    }

    #[test]
    fn test_decode_header_only() {
        let table = decode("Provider_ID,Name\n").unwrap();
        assert_eq!(table.columns(), &["Provider_ID", "Name"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_decode_crlf_and_missing_final_newline() {
        let table = decode("A,B\r\n1,x\r\n2,y").unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.value(1, "B"), Some(&Value::text("y")));
    }

    #[test]
    fn test_decode_skips_blank_lines() {
        let table = decode("A,B\n1,x\n\n2,y\n").unwrap();
        assert_eq!(table.num_rows(), 2);
    }

    #[test]
    fn test_decode_ragged_record() {
        let result = decode("A,B\n1\n");
        assert!(matches!(result, Err(PantryError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_decode_unterminated_quote() {
        assert!(decode("A,B\n\"oops,1\n").is_err());
    }

    #[test]
    fn test_decode_quoted_empty_field_counts() {
        let table = decode("A,B\n\"\",x\n").unwrap();
        assert_eq!(table.value(0, "A"), Some(&Value::text("")));
    }
}
