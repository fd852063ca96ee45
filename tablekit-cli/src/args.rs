//! Command line arguments.

use std::path::PathBuf;

use clap::ArgAction;
use clap::Parser;
use simplelog::LevelFilter;
use tablekit_lib::query::Direction;
use tablekit_lib::query::SortState;

#[derive(Parser, Debug)]
#[command(author, version, about = "Filter, sort, page and export JSON records as a table")]
pub struct Args {
    /// Records to show: a JSON file or an http(s) URL.
    #[arg(long, short)]
    pub records: String,

    /// Table definition (JSON). Without one, every field of the first record
    /// becomes a sortable column.
    #[arg(long, short)]
    pub table: Option<PathBuf>,

    /// Filter value as `key=value`. Repeatable. Date ranges take
    /// `start..end`, both inclusive; a date-only end covers the whole day.
    #[arg(long = "filter", short, value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    /// Sort as `field` or `field:asc|desc`.
    #[arg(long, short, value_parser = parse_sort)]
    pub sort: Option<SortState>,

    /// Page to show, starting at 1.
    #[arg(long, short, default_value_t = 1)]
    pub page: usize,

    /// Rows per page; must be one of the table's page size options.
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Write the whole filtered and sorted view as CSV to this file.
    #[arg(long, short)]
    pub export: Option<PathBuf>,

    /// Content type recorded for the export.
    #[arg(long)]
    pub mime: Option<String>,

    /// Bearer token sent when fetching records over HTTP.
    #[arg(long, env = "TABLEKIT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(long, short, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Whether records come from the network rather than a file.
    pub fn records_url(&self) -> Option<&str> {
        let records = self.records.as_str();
        (records.starts_with("http://") || records.starts_with("https://")).then_some(records)
    }
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing filter key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_sort(s: &str) -> Result<SortState, String> {
    let (field, direction) = match s.rsplit_once(':') {
        Some((field, "asc")) => (field, Direction::Asc),
        Some((field, "desc")) => (field, Direction::Desc),
        Some((_, other)) => return Err(format!("unknown sort direction '{other}'")),
        None => (s, Direction::Asc),
    };
    if field.is_empty() {
        return Err("missing sort field".to_string());
    }
    Ok(SortState::new(field, direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("search=eray"),
            Ok(("search".to_string(), "eray".to_string()))
        );
        assert_eq!(
            parse_filter("note=a=b"),
            Ok(("note".to_string(), "a=b".to_string()))
        );
        assert!(parse_filter("search").is_err());
        assert!(parse_filter("=x").is_err());
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("amount"), Ok(SortState::asc("amount")));
        assert_eq!(parse_sort("amount:desc"), Ok(SortState::desc("amount")));
        assert!(parse_sort("amount:sideways").is_err());
        assert!(parse_sort(":asc").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "tablekit",
            "--records",
            "https://example.com/payments",
            "-f",
            "status=success",
            "--filter",
            "amount=100",
            "--sort",
            "amount:desc",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.filters.len(), 2);
        assert_eq!(args.records_url(), Some("https://example.com/payments"));
        assert_eq!(args.log_level(), LevelFilter::Debug);
        assert_eq!(args.page, 1);
    }
}
