//! CSV import/export of the service-type catalog.
//!
//! Wire shape: header row `name,title,description`, CRLF row terminators,
//! RFC4180 quoting. Imported rows carry no provenance of their own, so their
//! tags default to the catalog source tag.

use models::{validate_name, ServiceTypeEntry};

use crate::errors::ServiceError;

pub const CSV_HEADER: &str = "name,title,description";

/// Attachment filename for a catalog export.
pub fn export_file_name(tenant: &str, environment: &str) -> String {
    format!("{tenant}-service-types-{environment}.csv")
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\r') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Serialize `entries` sorted by name. Rows are CRLF-separated with no
/// trailing terminator; tags are not exported.
pub fn export(entries: &[ServiceTypeEntry]) -> String {
    let mut sorted: Vec<&ServiceTypeEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = String::from(CSV_HEADER);
    for e in sorted {
        out.push_str("\r\n");
        out.push_str(&escape_field(&e.name));
        out.push(',');
        out.push_str(&escape_field(e.title.as_deref().unwrap_or_default()));
        out.push(',');
        out.push_str(&escape_field(&e.description));
    }
    out
}

/// Split CSV text into records of fields, honoring RFC4180 quoting
/// (quoted fields, doubled quotes, embedded separators and line breaks).
/// Accepts both CRLF and bare LF record terminators.
fn parse_records(text: &str) -> Result<Vec<Vec<String>>, ServiceError> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // set when a closing quote ends the field; only a separator or record
    // terminator may follow it
    let mut quote_closed = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                        quote_closed = true;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => {
                if field.is_empty() && !quote_closed {
                    in_quotes = true;
                } else {
                    return Err(ServiceError::Validation(format!(
                        "row {}: quote inside unquoted field",
                        records.len() + 1
                    )));
                }
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                quote_closed = false;
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                quote_closed = false;
            }
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                quote_closed = false;
            }
            _ => {
                if quote_closed {
                    return Err(ServiceError::Validation(format!(
                        "row {}: text after closing quote",
                        records.len() + 1
                    )));
                }
                field.push(c);
            }
        }
    }
    if in_quotes {
        return Err(ServiceError::Validation("unterminated quoted field".into()));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    // a trailing terminator leaves one empty single-field record; drop it
    records.retain(|r| !(r.len() == 1 && r[0].is_empty()));
    Ok(records)
}

/// Parse a catalog CSV. The header must match `name,title,description`
/// exactly; duplicate names within the file are rejected rather than
/// silently deduplicated. Empty titles become `None`.
pub fn import(text: &str) -> Result<Vec<ServiceTypeEntry>, ServiceError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let records = parse_records(text)?;
    let mut rows = records.into_iter();

    let header = rows
        .next()
        .ok_or_else(|| ServiceError::Validation("empty CSV".into()))?;
    if header.iter().map(String::as_str).collect::<Vec<_>>() != ["name", "title", "description"] {
        return Err(ServiceError::Validation(format!(
            "invalid CSV header; expected '{CSV_HEADER}'"
        )));
    }

    let mut entries: Vec<ServiceTypeEntry> = Vec::new();
    for (i, row) in rows.enumerate() {
        if row.len() != 3 {
            return Err(ServiceError::Validation(format!(
                "row {}: expected 3 fields, found {}",
                i + 1,
                row.len()
            )));
        }
        let name = row[0].trim().to_string();
        validate_name(&name)?;
        if entries.iter().any(|e| e.name == name) {
            return Err(ServiceError::Validation(format!(
                "duplicate name '{name}' in import"
            )));
        }
        let title = if row[1].is_empty() { None } else { Some(row[1].as_str()) };
        entries.push(ServiceTypeEntry::local(&name, title, &row[2]));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::SOURCE_TAG;

    fn entry(name: &str, title: &str, description: &str) -> ServiceTypeEntry {
        ServiceTypeEntry {
            name: name.into(),
            title: Some(title.into()),
            description: description.into(),
            tags: vec!["topology".into()],
        }
    }

    #[test]
    fn export_sorts_by_name_with_crlf() {
        let entries = vec![entry("b", "B", "d2"), entry("a", "A", "d1")];
        assert_eq!(export(&entries), "name,title,description\r\na,A,d1\r\nb,B,d2");
    }

    #[test]
    fn export_escapes_embedded_separators() {
        let entries = vec![ServiceTypeEntry {
            name: "svc".into(),
            title: Some("a, \"quoted\" title".into()),
            description: "line1\nline2".into(),
            tags: vec![],
        }];
        assert_eq!(
            export(&entries),
            "name,title,description\r\nsvc,\"a, \"\"quoted\"\" title\",\"line1\nline2\""
        );
    }

    #[test]
    fn export_of_empty_catalog_is_header_only() {
        assert_eq!(export(&[]), "name,title,description");
    }

    #[test]
    fn import_round_trips_export() {
        let entries = vec![entry("a", "A", "d1"), entry("b", "B", "d, 2")];
        let imported = import(&export(&entries)).expect("import");
        assert_eq!(imported.len(), 2);
        assert_eq!(imported[0].name, "a");
        assert_eq!(imported[1].description, "d, 2");
        assert_eq!(imported[0].tags, vec![SOURCE_TAG.to_string()]);
    }

    #[test]
    fn import_accepts_bare_lf_and_trailing_newline() {
        let text = "name,title,description\na,A,d1\nb,,d2\n";
        let imported = import(text).expect("import");
        assert_eq!(imported.len(), 2);
        assert!(imported[1].title.is_none());
    }

    #[test]
    fn import_parses_quoted_fields() {
        let text = "name,title,description\r\nsvc,\"a, title\",\"he said \"\"hi\"\"\"";
        let imported = import(text).expect("import");
        assert_eq!(imported[0].title.as_deref(), Some("a, title"));
        assert_eq!(imported[0].description, "he said \"hi\"");
    }

    #[test]
    fn import_rejects_bad_header() {
        let err = import("name,description\r\na,d").expect_err("header");
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn import_rejects_duplicate_names() {
        let text = "name,title,description\r\na,A,d1\r\na,A2,d2";
        let err = import(text).expect_err("duplicate");
        assert!(matches!(err, ServiceError::Validation(msg) if msg.contains("duplicate name 'a'")));
    }

    #[test]
    fn import_rejects_wrong_arity_and_empty_name() {
        assert!(import("name,title,description\r\na,b").is_err());
        assert!(import("name,title,description\r\n,t,d").is_err());
    }

    #[test]
    fn import_rejects_unterminated_quote() {
        assert!(import("name,title,description\r\na,\"open,d").is_err());
    }

    #[test]
    fn import_rejects_text_after_closing_quote() {
        let err = import("name,title,description\r\n\"a\"x,t,d").expect_err("trailing text");
        assert!(matches!(err, ServiceError::Validation(msg) if msg.contains("closing quote")));
        // a quoted field followed directly by a separator is still fine
        assert!(import("name,title,description\r\n\"a\",t,d").is_ok());
    }

    #[test]
    fn export_file_name_pattern() {
        assert_eq!(export_file_name("egi", "devel"), "egi-service-types-devel.csv");
    }
}
