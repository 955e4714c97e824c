#[path = "../config.rs"]
mod config;
#[path = "../dataset.rs"]
mod dataset;
#[path = "../error.rs"]
mod error;
#[path = "../form.rs"]
mod form;
#[path = "../hma.rs"]
mod hma;
#[path = "../record.rs"]
mod record;
#[path = "../session.rs"]
mod session;

use clap::Parser;
use config::{ConfigArgs, EditorConfig};
use error::{EditorError, Result};
use form::{EditField, FormState};
use session::EditorSession;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless creature record editor")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
    /// Print every selectable record with its current BST
    #[arg(long)]
    list: bool,
    /// Record to edit and commit
    #[arg(long, value_name = "NAME")]
    select: Option<String>,
    /// Field edit for the selected record, e.g. --set "Sp Atk=120"
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment, requires = "select")]
    edits: Vec<(String, String)>,
    /// Write the committed records as JSON
    #[arg(long)]
    export_json: bool,
    /// Write the committed records as CSV
    #[arg(long)]
    export_csv: bool,
    /// Merge the committed records into the HMA stats table as a .tfl script
    #[arg(long)]
    export_hma: bool,
}

fn parse_assignment(raw: &str) -> std::result::Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))?;
    Ok((field.trim().to_string(), value.trim().to_string()))
}

fn build_form(edits: &[(String, String)]) -> Result<FormState> {
    let mut form = FormState::default();
    for (name, value) in edits {
        let field = EditField::parse(name).ok_or_else(|| EditorError::UnknownField(name.clone()))?;
        form.set(field, value.as_str());
    }
    Ok(form)
}

fn run(cli: Cli) -> Result<()> {
    let config = EditorConfig::from(cli.config);
    let mut session = EditorSession::new(dataset::load_dataset(&config.dataset_path)?);
    if let Some(path) = &config.overrides_path {
        let imported = session.import_overrides(dataset::load_overrides(path)?);
        println!("Loaded {imported} custom records from {}", path.display());
    }

    if cli.list {
        for name in session.selectable_names() {
            if let Some(record) = session.effective(&name) {
                let marker = if session.override_for(&name).is_some() { "*" } else { " " };
                println!("{marker} #{:<5} {:<28} BST {}", record.id, record.name, record.aggregate());
            }
        }
    }

    if let Some(name) = &cli.select {
        let form = build_form(&cli.edits)?;
        let original = session
            .effective(name)
            .map(|record| record.aggregate())
            .ok_or_else(|| EditorError::UnknownRecord(name.clone()))?;
        let live = session.preview(name, &form)?;
        println!("{name}: BST {original} -> {live} ({})", record::aggregate_tier(live).aggregate_label());
        let committed = session.commit(name, &form)?;
        println!("Committed {} (BST: {})", committed.name, committed.aggregate());
    }

    let mut exports = Vec::new();
    if cli.export_json {
        exports.push(session.export_json(&config.export_dir));
    }
    if cli.export_csv {
        exports.push(session.export_csv(&config.export_dir));
    }
    if cli.export_hma {
        exports.push(session.export_hma_patch(
            &config.hma_stats_path,
            &config.hma_abilities_path,
            &config.export_dir,
        ));
    }
    for outcome in exports {
        match outcome {
            Ok(path) => println!("Saved {}", path.display()),
            Err(EditorError::NothingToExport) => println!("No custom Pokémon to export."),
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "editor_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
