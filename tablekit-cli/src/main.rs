mod args;
mod paths;
mod table;

use std::fs;
use std::fs::File;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use simplelog::ColorChoice;
use simplelog::CombinedLogger;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::SharedLogger;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use simplelog::WriteLogger;
use tablekit_lib::TableDefinition;
use tablekit_lib::TableSession;
use tablekit_lib::config::TableSpec;
use tablekit_lib::export::DiskSink;
use tablekit_lib::source::HttpSource;
use tablekit_lib::source::JsonFileSource;
use tablekit_lib::source::RecordSource;

use crate::args::Args;

fn init_logging(level: LevelFilter) {
    paths::rotate_logs();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let log_file = paths::log_file().and_then(|path| {
        fs::create_dir_all(path.parent()?).ok()?;
        File::create(&path).ok()
    });
    if let Some(file) = log_file {
        loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), file));
    }

    // Only fails if a logger is already set
    let _ = CombinedLogger::init(loggers);
}

fn record_source(args: &Args) -> Box<dyn RecordSource> {
    match args.records_url() {
        Some(url) => {
            let source = HttpSource::new(url);
            match &args.token {
                Some(token) => Box::new(source.bearer_token(token)),
                None => Box::new(source),
            }
        }
        None => Box::new(JsonFileSource::new(&args.records)),
    }
}

/// Applies the export flags to the definition.
fn with_export_flags(mut definition: TableDefinition, args: &Args) -> TableDefinition {
    if let Some(name) = args.export.as_deref().and_then(Path::file_name) {
        definition.export.filename = name.to_string_lossy().into_owned();
    }
    if let Some(mime) = &args.mime {
        definition.export.mime = mime.clone();
    }
    definition
}

async fn open_session(args: &Args) -> anyhow::Result<TableSession> {
    let source = record_source(args);

    let session = match &args.table {
        Some(path) => {
            let definition = TableSpec::from_path(path)
                .and_then(TableSpec::into_definition)
                .with_context(|| format!("loading table definition {}", path.display()))?;
            let mut session = TableSession::new(with_export_flags(definition, args));
            session
                .load(source.as_ref())
                .await
                .with_context(|| format!("loading records from {}", source.describe()))?;
            session
        }
        None => {
            let records = source
                .fetch()
                .await
                .with_context(|| format!("loading records from {}", source.describe()))?;
            let definition = table::infer_definition(&records);
            TableSession::with_records(with_export_flags(definition, args), records)
        }
    };
    Ok(session)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level());

    let mut session = open_session(&args).await?;

    for (key, raw) in &args.filters {
        let value = table::filter_value(session.definition(), key, raw)?;
        session.set_filter(key.as_str(), Some(value));
    }
    if let Some(sort) = &args.sort {
        if session.definition().column(&sort.field).is_none() {
            log::warn!("Sorting by '{}', which is not a column", sort.field);
        }
        session.set_sort(Some(sort.clone()));
    }
    if let Some(size) = args.page_size {
        session.set_page_size(size)?;
    }
    session.set_page(args.page.saturating_sub(1));

    if let Some(title) = &session.definition().title {
        println!("{title}");
    }
    println!("{}", table::render_page(&mut session));

    let info = session.page_info();
    println!("{}  (page {} of {})", info, info.page + 1, info.page_count.max(1));
    let active = session.active_filters();
    if !active.is_empty() {
        let summary: Vec<String> = active
            .iter()
            .map(|(k, v)| format!("{k}={}", table::describe_filter(v)))
            .collect();
        println!("Filters: {}", summary.join(", "));
    }

    if let Some(path) = &args.export {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file = session
            .export(&DiskSink::new(dir))
            .await
            .with_context(|| format!("exporting to {}", path.display()))?;
        println!("Exported {} ({})", path.display(), file.mime);
    }

    Ok(())
}
