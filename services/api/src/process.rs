use crate::cli::{RulesShowArgs, RulesValidateArgs};
use crate::infra::{load_ruleset, parse_column_map};
use clap::{Args, ValueEnum};
use lead_pipeline::config::AppConfig;
use lead_pipeline::error::AppError;
use lead_pipeline::workflows::leads::{
    write_leads_csv, write_salesforce_csv, BatchOutcome, ColumnMap, LeadService, Ruleset,
    RulesStore, SalesforceLead,
};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Scored leads as a JSON array
    #[default]
    Json,
    /// Scored leads as flattened CSV rows
    Csv,
    /// Salesforce lead import CSV
    Salesforce,
}

#[derive(Args, Debug)]
pub(crate) struct ProcessArgs {
    /// CSV export to process
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// JSON object mapping lead fields to CSV headers, e.g. {"email":"Work Email"}
    #[arg(long, value_parser = parse_column_map)]
    pub(crate) column_map: Option<ColumnMap>,
    /// Leave dropped records out of the output (the summary still counts them)
    #[arg(long)]
    pub(crate) drop_invalid: bool,
    /// Output encoding written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub(crate) format: OutputFormat,
    /// Rules file to score with instead of APP_RULES_PATH
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

pub(crate) fn run_process(args: ProcessArgs) -> Result<(), AppError> {
    let ProcessArgs {
        csv,
        column_map,
        drop_invalid,
        format,
        rules,
    } = args;

    let ruleset = load_ruleset(resolve_rules_path(rules)?.as_deref())?;
    let service = LeadService::new(Arc::new(RulesStore::new(ruleset)?))
        .with_max_batch_size(usize::MAX);

    let file = File::open(&csv)?;
    let columns = column_map.unwrap_or_default();
    let outcome = service.ingest_csv(file, &columns, drop_invalid)?;

    let stdout = io::stdout();
    render_outcome(stdout.lock(), &outcome, format)?;

    let summary = serde_json::to_string(&outcome.summary)?;
    eprintln!("{}: {summary}", display_path(&csv));
    Ok(())
}

fn render_outcome<W: Write>(
    mut writer: W,
    outcome: &BatchOutcome,
    format: OutputFormat,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &outcome.results)?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => write_leads_csv(writer, &outcome.results)?,
        OutputFormat::Salesforce => {
            let rows: Vec<SalesforceLead> =
                outcome.results.iter().map(SalesforceLead::from).collect();
            write_salesforce_csv(writer, &rows)?;
        }
    }
    Ok(())
}

pub(crate) fn run_rules_show(args: RulesShowArgs) -> Result<(), AppError> {
    let ruleset = load_ruleset(resolve_rules_path(args.rules)?.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&ruleset)?);
    Ok(())
}

pub(crate) fn run_rules_validate(args: RulesValidateArgs) -> Result<(), AppError> {
    let ruleset = Ruleset::read(&args.path)?;
    println!(
        "{} is valid: {} title keywords, {} size bands, {} country boosts, {} source boosts",
        display_path(&args.path),
        ruleset.title_includes.len(),
        ruleset.company_size_points.len(),
        ruleset.country_boost.len(),
        ruleset.source_boost.len()
    );
    Ok(())
}

/// Explicit `--rules` wins; otherwise fall back to `APP_RULES_PATH`.
fn resolve_rules_path(explicit: Option<PathBuf>) -> Result<Option<PathBuf>, AppError> {
    match explicit {
        Some(path) => Ok(Some(path)),
        None => Ok(AppConfig::load()?.rules.path),
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
