//! Terminal presentation of a table session.

use anyhow::Context;
use anyhow::bail;
use comfy_table::Cell;
use comfy_table::CellAlignment;
use comfy_table::Color;
use comfy_table::Table;
use tablekit_lib::TableDefinition;
use tablekit_lib::TableSession;
use tablekit_lib::model::Alignment;
use tablekit_lib::model::Column;
use tablekit_lib::model::ID_FIELD;
use tablekit_lib::model::Record;
use tablekit_lib::model::Value;
use tablekit_lib::query::DateRange;
use tablekit_lib::query::Direction;
use tablekit_lib::query::FilterKind;
use tablekit_lib::query::FilterValue;
use tablekit_lib::render::CellContent;
use tablekit_lib::render::Tone;

/// Builds a definition with one sortable column per field of the first
/// record, `id` first.
pub fn infer_definition(records: &[Record]) -> TableDefinition {
    let mut keys: Vec<&str> = records
        .first()
        .map(|r| r.fields().keys().map(String::as_str).collect())
        .unwrap_or_default();
    if let Some(pos) = keys.iter().position(|k| *k == ID_FIELD) {
        let id = keys.remove(pos);
        keys.insert(0, id);
    }

    let columns = keys
        .into_iter()
        .map(|key| {
            let column = Column::new(key, key).sortable();
            match records[0].get(key) {
                Some(value) if value.is_numeric() => column.align(Alignment::Right),
                _ => column,
            }
        })
        .collect();
    TableDefinition::new(columns)
}

/// Converts command line text into a value for the filter named `key`.
pub fn filter_value(definition: &TableDefinition, key: &str, raw: &str) -> anyhow::Result<FilterValue> {
    match definition.filter(key).map(|f| &f.kind) {
        Some(FilterKind::Number { .. }) => {
            let n: f64 = raw
                .trim()
                .parse()
                .with_context(|| format!("filter '{key}' needs a number, got '{raw}'"))?;
            Ok(FilterValue::Number(n))
        }
        Some(FilterKind::DateRange) => {
            let (start, end) = raw.split_once("..").unwrap_or((raw, ""));
            Ok(FilterValue::Range(DateRange::new(
                parse_bound(key, start, false)?,
                parse_bound(key, end, true)?,
            )))
        }
        Some(FilterKind::Select { options }) => {
            if !options.is_empty() && !options.iter().any(|o| o.value == raw) {
                log::warn!("'{}' is not an option of filter '{}'", raw, key);
            }
            Ok(FilterValue::text(raw))
        }
        Some(FilterKind::Text { .. }) | None => Ok(FilterValue::text(raw)),
    }
}

/// Short text form of a filter value for status lines.
pub fn describe_filter(value: &FilterValue) -> String {
    let date = |at: Option<chrono::DateTime<chrono::Utc>>| {
        at.map(|at| at.format("%Y-%m-%d").to_string()).unwrap_or_default()
    };
    match value {
        FilterValue::Number(n) => Value::Float(*n).to_text(),
        FilterValue::Text(s) => s.clone(),
        FilterValue::Range(range) => format!("{}..{}", date(range.start), date(range.end)),
    }
}

// A date-only end bound covers that whole day.
fn parse_bound(
    key: &str,
    text: &str,
    end: bool,
) -> anyhow::Result<Option<chrono::DateTime<chrono::Utc>>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if end && let Ok(day) = chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        let last = day.and_hms_milli_opt(23, 59, 59, 999).map(|at| at.and_utc());
        return Ok(last);
    }
    match Value::from(text).as_datetime() {
        Some(at) => Ok(Some(at)),
        None => bail!("filter '{key}' needs dates like 2024-01-31, got '{text}'"),
    }
}

fn alignment(align: Alignment) -> CellAlignment {
    match align {
        Alignment::Left => CellAlignment::Left,
        Alignment::Center => CellAlignment::Center,
        Alignment::Right => CellAlignment::Right,
    }
}

fn tone_color(tone: Tone) -> Option<Color> {
    match tone {
        Tone::Neutral => None,
        Tone::Info => Some(Color::Blue),
        Tone::Success => Some(Color::Green),
        Tone::Warning => Some(Color::Yellow),
        Tone::Error => Some(Color::Red),
    }
}

fn body_cell(column: &Column, record: &Record) -> Cell {
    let content = column.present(record);
    let cell = Cell::new(content.display_text()).set_alignment(alignment(column.align));
    match content {
        CellContent::Badge(badge) => match tone_color(badge.tone) {
            Some(color) => cell.fg(color),
            None => cell,
        },
        CellContent::Plain(_) => cell,
    }
}

/// Renders the current page, with sort markers in the header.
pub fn render_page(session: &mut TableSession) -> Table {
    let sort = session.sort().cloned();
    let rows = session.visible_rows();
    let columns = &session.definition().columns;

    let mut table = Table::new();
    table.set_header(columns.iter().map(|column| {
        let marker = match &sort {
            Some(s) if s.field == column.key => match s.direction {
                Direction::Asc => " ▲",
                Direction::Desc => " ▼",
            },
            _ => "",
        };
        Cell::new(format!("{}{}", column.label, marker)).set_alignment(alignment(column.align))
    }));

    for record in rows.iter() {
        table.add_row(columns.iter().map(|column| body_cell(column, record)));
    }
    table
}
