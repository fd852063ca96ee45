//! CSV serialization of table rows.
//!
//! The output format is fixed:
//! - The header line is the column labels joined by `,`, written as-is.
//! - Every data field is wrapped in double quotes, with `"` doubled.
//! - Lines are joined by `\n` with no trailing newline.
//! - Absent values print `undefined` and nulls print `null`.
//!
//! Cell text comes from [`Column::export_text`], so renderers shape exports
//! the same way they shape the screen.

use csv::QuoteStyle;
use csv::Terminator;
use csv::Writer;
use csv::WriterBuilder;

use crate::model::Column;
use crate::model::Record;

// Data rows: every field quoted, `\n` after each record.
fn row_writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

/// Header line: column labels in order, unquoted.
pub fn header_line(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| c.label.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Serializes rows under the given columns.
///
/// An empty row set yields just the header line.
///
/// ```
/// use tablekit_lib::export::csv::to_csv;
/// use tablekit_lib::model::Column;
/// use tablekit_lib::model::Record;
///
/// let columns = vec![Column::new("quote", "Quote")];
/// let records = vec![Record::new().set("quote", r#"say "hi""#)];
///
/// assert_eq!(to_csv(&columns, &records).unwrap(), "Quote\n\"say \"\"hi\"\"\"");
/// ```
pub fn to_csv<'a>(
    columns: &[Column],
    rows: impl IntoIterator<Item = &'a Record>,
) -> Result<String, csv::Error> {
    let mut wtr = row_writer();
    for record in rows {
        wtr.write_record(columns.iter().map(|c| c.export_text(record)))?;
    }
    let mut body = wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;

    let mut out = header_line(columns).into_bytes();
    if body.pop().is_some() {
        out.push(b'\n');
        out.append(&mut body);
    }
    // Labels and cell text are both `str`, so this never replaces anything.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::render::BadgeMap;
    use crate::render::Currency;
    use crate::render::FnRenderer;
    use crate::render::Template;
    use crate::render::Tone;

    #[test]
    fn test_quotes_and_commas() {
        let columns = vec![Column::new("id", "ID"), Column::new("description", "Description")];
        let records = vec![
            Record::new()
                .set("id", 1i64)
                .set("description", "Contains \"quotes\" and, commas"),
        ];

        assert_eq!(
            to_csv(&columns, &records).unwrap(),
            "ID,Description\n\"1\",\"Contains \"\"quotes\"\" and, commas\""
        );
    }

    #[test]
    fn test_empty_rows_give_header_only() {
        let columns = vec![Column::new("id", "ID"), Column::new("name", "Name")];
        assert_eq!(to_csv(&columns, &[]).unwrap(), "ID,Name");
    }

    #[test]
    fn test_empty_text_is_quoted_without_trailing_newline() {
        let columns = vec![Column::new("id", "ID"), Column::new("note", "Note")];
        let records = vec![
            Record::new().set("id", 1i64).set("note", ""),
            Record::new().set("id", 2i64).set("note", "ok"),
        ];

        let csv = to_csv(&columns, &records).unwrap();
        assert_eq!(csv, "ID,Note\n\"1\",\"\"\n\"2\",\"ok\"");
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_absent_and_null() {
        let columns = vec![Column::new("a", "A"), Column::new("b", "B")];
        let records = vec![Record::new().set("a", Value::Null)];

        assert_eq!(to_csv(&columns, &records).unwrap(), "A,B\n\"null\",\"undefined\"");
    }

    #[test]
    fn test_newlines_stay_inside_quotes() {
        let columns = vec![Column::new("note", "Note")];
        let records = vec![Record::new().set("note", "line one\nline two")];

        assert_eq!(to_csv(&columns, &records).unwrap(), "Note\n\"line one\nline two\"");
    }

    #[test]
    fn test_renderers_shape_export_text() {
        let columns = vec![
            Column::new("nameSurname", "Name Surname").render(Template::new("{name} {surname}")),
            Column::new("amount", "Amount").render(Currency::dollar()),
            Column::new("status", "Status")
                .render(BadgeMap::new().entry("success", "Successful", Tone::Success)),
        ];
        let records = vec![
            Record::new()
                .set("name", "Cagatay")
                .set("surname", "Doe")
                .set("amount", 1500i64)
                .set("status", "success"),
        ];

        assert_eq!(
            to_csv(&columns, &records).unwrap(),
            "Name Surname,Amount,Status\n\"Cagatay Doe\",\"$1,500.00\",\"success\""
        );
    }

    #[test]
    fn test_nested_fields_and_plain_text() {
        let columns = vec![
            Column::new("customer.name", "Customer"),
            Column::new("flag", "Flag").render(
                FnRenderer::new(|_, _| crate::render::CellContent::text("ignored"))
                    .with_plain_text(|raw, _| format!("[{}]", crate::model::text_of(raw))),
            ),
        ];
        let records = vec![
            Record::new()
                .set("customer", Record::new().set("name", "Eray"))
                .set("flag", true),
        ];

        assert_eq!(to_csv(&columns, &records).unwrap(), "Customer,Flag\n\"Eray\",\"[true]\"");
    }
}
