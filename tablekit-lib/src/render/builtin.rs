//! Built-in cell renderers.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

use super::Badge;
use super::CellContent;
use super::CellRenderer;
use super::Tone;
use crate::model::Record;
use crate::model::Value;

// =============================================================================
// Template
// =============================================================================

/// Builds a cell from other fields of the record.
///
/// Placeholders are field keys (or dotted paths) in braces. Absent and null
/// fields render as empty text. A brace without a partner is kept literally.
///
/// ```
/// use tablekit_lib::model::Record;
/// use tablekit_lib::render::{CellRenderer, Template};
///
/// let record = Record::new().set("name", "Cagatay").set("surname", "Doe");
/// let cell = Template::new("{name} {surname}").display(None, &record);
/// assert_eq!(cell.display_text(), "Cagatay Doe");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pattern: String,
}

impl Template {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    fn fill(&self, record: &Record) -> String {
        let mut out = String::with_capacity(self.pattern.len());
        let mut rest = self.pattern.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let key = after[..close].trim();
                    match record.resolve(key) {
                        Some(Value::Null) | None => {}
                        Some(value) => out.push_str(&value.to_text()),
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

impl CellRenderer for Template {
    fn display(&self, _raw: Option<&Value>, record: &Record) -> CellContent {
        CellContent::text(self.fill(record))
    }

    fn name(&self) -> &'static str {
        "template"
    }
}

// =============================================================================
// Currency
// =============================================================================

/// Formats numeric values as money.
///
/// Non-numeric values pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    pub symbol: String,
    pub decimals: u32,
    pub thousands_separator: String,
    pub decimal_separator: String,
    /// Whether the symbol follows the amount (`12,00 €`).
    pub symbol_after: bool,
}

impl Currency {
    /// Turkish lira, `₺1.234,56`.
    pub fn lira() -> Self {
        Self {
            symbol: "₺".to_string(),
            decimals: 2,
            thousands_separator: ".".to_string(),
            decimal_separator: ",".to_string(),
            symbol_after: false,
        }
    }

    /// US dollar, `$1,234.56`.
    pub fn dollar() -> Self {
        Self {
            symbol: "$".to_string(),
            decimals: 2,
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            symbol_after: false,
        }
    }

    /// Formats a decimal amount.
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = amount
            .abs()
            .round_dp_with_strategy(self.decimals, RoundingStrategy::MidpointAwayFromZero);
        let text = format!("{:.*}", self.decimals as usize, rounded);
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (text.as_str(), None),
        };

        let mut grouped = String::new();
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push_str(&self.thousands_separator);
            }
            grouped.push(ch);
        }
        if let Some(frac) = frac_part {
            grouped.push_str(&self.decimal_separator);
            grouped.push_str(frac);
        }

        let sign = if amount.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        if self.symbol_after {
            format!("{sign}{grouped} {}", self.symbol)
        } else {
            format!("{sign}{}{grouped}", self.symbol)
        }
    }

    fn amount(value: &Value) -> Option<Decimal> {
        match value {
            Value::Int(n) => Some(Decimal::from(*n)),
            Value::Long(n) => Some(Decimal::from(*n)),
            Value::Float(f) => Decimal::try_from(*f).ok(),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }
}

impl CellRenderer for Currency {
    fn display(&self, raw: Option<&Value>, _record: &Record) -> CellContent {
        match raw.and_then(Self::amount) {
            Some(amount) => CellContent::text(self.format(amount)),
            None => CellContent::from_raw(raw),
        }
    }

    fn name(&self) -> &'static str {
        "currency"
    }
}

// =============================================================================
// DateFormat
// =============================================================================

/// Formats temporal values with a `chrono` format string.
///
/// Values that are not timestamps pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    format: String,
}

impl DateFormat {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::new("%d/%m/%Y %H:%M")
    }
}

impl CellRenderer for DateFormat {
    fn display(&self, raw: Option<&Value>, _record: &Record) -> CellContent {
        match raw.and_then(Value::as_datetime) {
            Some(dt) => CellContent::text(dt.format(&self.format).to_string()),
            None => CellContent::from_raw(raw),
        }
    }

    fn name(&self) -> &'static str {
        "date"
    }
}

// =============================================================================
// Uppercase
// =============================================================================

/// Uppercases string values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Uppercase;

impl CellRenderer for Uppercase {
    fn display(&self, raw: Option<&Value>, _record: &Record) -> CellContent {
        match raw {
            Some(Value::String(s)) => CellContent::text(s.to_uppercase()),
            other => CellContent::from_raw(other),
        }
    }

    fn name(&self) -> &'static str {
        "uppercase"
    }
}

// =============================================================================
// BadgeMap
// =============================================================================

/// Shows a value as a badge with a mapped label and tone.
///
/// Badges are structured content, so exports write the raw value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeMap {
    labels: BTreeMap<String, String>,
    tones: BTreeMap<String, Tone>,
}

impl BadgeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mapping for one raw value.
    pub fn entry(mut self, value: impl Into<String>, label: impl Into<String>, tone: Tone) -> Self {
        let value = value.into();
        self.labels.insert(value.clone(), label.into());
        self.tones.insert(value, tone);
        self
    }

    pub fn from_maps(labels: BTreeMap<String, String>, tones: BTreeMap<String, Tone>) -> Self {
        Self { labels, tones }
    }
}

impl CellRenderer for BadgeMap {
    fn display(&self, raw: Option<&Value>, _record: &Record) -> CellContent {
        let key = match raw {
            Some(Value::Null) | None => return CellContent::from_raw(raw),
            Some(value) => value.to_text(),
        };
        let label = self.labels.get(&key).cloned().unwrap_or_else(|| key.clone());
        let tone = self.tones.get(&key).copied().unwrap_or_default();
        CellContent::Badge(Badge::new(label, tone))
    }

    fn name(&self) -> &'static str {
        "badge"
    }
}

// =============================================================================
// FnRenderer
// =============================================================================

type DisplayFn = dyn Fn(Option<&Value>, &Record) -> CellContent + Send + Sync;
type PlainFn = dyn Fn(Option<&Value>, &Record) -> String + Send + Sync;

/// Renderer built from closures.
///
/// ```
/// use tablekit_lib::model::{Record, Value};
/// use tablekit_lib::render::{CellContent, CellRenderer, FnRenderer};
///
/// let renderer = FnRenderer::new(|raw, _| match raw {
///     Some(Value::Bool(true)) => CellContent::text("yes"),
///     _ => CellContent::text("no"),
/// });
/// let record = Record::new();
/// assert_eq!(renderer.display(Some(&Value::Bool(true)), &record).display_text(), "yes");
/// ```
pub struct FnRenderer {
    display: Box<DisplayFn>,
    plain: Option<Box<PlainFn>>,
}

impl FnRenderer {
    pub fn new<F>(display: F) -> Self
    where
        F: Fn(Option<&Value>, &Record) -> CellContent + Send + Sync + 'static,
    {
        Self {
            display: Box::new(display),
            plain: None,
        }
    }

    /// Adds an explicit export text transform.
    pub fn with_plain_text<F>(mut self, plain: F) -> Self
    where
        F: Fn(Option<&Value>, &Record) -> String + Send + Sync + 'static,
    {
        self.plain = Some(Box::new(plain));
        self
    }
}

impl CellRenderer for FnRenderer {
    fn display(&self, raw: Option<&Value>, record: &Record) -> CellContent {
        (self.display)(raw, record)
    }

    fn plain_text(&self, raw: Option<&Value>, record: &Record) -> Option<String> {
        self.plain.as_ref().map(|plain| plain(raw, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment() -> Record {
        Record::new()
            .set("id", "pay_1")
            .set("name", "Cagatay")
            .set("surname", "Doe")
            .set("amount", 1234.5)
            .set("timestamp", "2024-01-15T09:05:00Z")
            .set("status", "success")
    }

    #[test]
    fn test_template_fills_fields() {
        let record = payment();
        let cell = Template::new("{name} {surname}").display(None, &record);
        assert_eq!(cell, CellContent::text("Cagatay Doe"));
    }

    #[test]
    fn test_template_missing_and_unbalanced() {
        let record = payment();
        assert_eq!(
            Template::new("{middle}-{name").display(None, &record),
            CellContent::text("-{name")
        );
    }

    #[test]
    fn test_currency_formats() {
        assert_eq!(Currency::lira().format(Decimal::new(123_456, 2)), "₺1.234,56");
        assert_eq!(Currency::dollar().format(Decimal::new(-1_000_000, 0)), "-$1,000,000.00");
        assert_eq!(Currency::dollar().format(Decimal::new(5, 1)), "$0.50");
        assert_eq!(Currency::dollar().format(Decimal::new(-1, 3)), "$0.00");
    }

    #[test]
    fn test_currency_passes_through_text() {
        let record = payment();
        let raw = Value::from("n/a");
        assert_eq!(
            Currency::lira().display(Some(&raw), &record),
            CellContent::from_raw(Some(&raw))
        );
    }

    #[test]
    fn test_date_format() {
        let record = payment();
        let cell = DateFormat::default().display(record.get("timestamp"), &record);
        assert_eq!(cell.display_text(), "15/01/2024 09:05");
    }

    #[test]
    fn test_badge_map() {
        let record = payment();
        let badges = BadgeMap::new()
            .entry("success", "Successful", Tone::Success)
            .entry("failed", "Failed", Tone::Error);

        assert_eq!(
            badges.display(record.get("status"), &record),
            CellContent::Badge(Badge::new("Successful", Tone::Success))
        );
        assert_eq!(
            badges.display(Some(&Value::from("pending")), &record),
            CellContent::Badge(Badge::new("pending", Tone::Neutral))
        );
        assert_eq!(badges.plain_text(record.get("status"), &record), None);
    }

    #[test]
    fn test_fn_renderer_plain_text() {
        let renderer = FnRenderer::new(|_, _| CellContent::Badge(Badge::new("x", Tone::Info)))
            .with_plain_text(|raw, _| format!("<{}>", crate::model::text_of(raw)));
        let record = payment();
        assert_eq!(
            renderer.plain_text(record.get("status"), &record),
            Some("<success>".to_string())
        );
    }
}
