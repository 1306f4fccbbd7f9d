use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use hunterborn_core::load::{
    load_exclusion_lists, load_plugin_dir, load_records, load_selections, merge_selections,
    save_selections,
};
use hunterborn_core::report::selection_report;
use hunterborn_core::{make_heuristic_selections, ExclusionLists, ExtenderError, Result};

#[derive(Debug, Parser)]
#[command(
    name = "hunterborn-heuristics",
    version,
    about = "Matches creature death items to Hunterborn plugin entries"
)]
struct Args {
    /// JSON dump of NPC, race and leveled item records.
    #[arg(long)]
    records: PathBuf,

    /// Directory of plugin definition JSON files.
    #[arg(long)]
    plugins: PathBuf,

    /// JSON exclusion lists. Without it nothing is forbidden and only plugin
    /// voices are allowed.
    #[arg(long)]
    lists: Option<PathBuf>,

    /// Saved selections from a previous run.
    #[arg(long)]
    previous: Option<PathBuf>,

    /// Where to write the selections.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Optional plain-text report of the selections.
    #[arg(long)]
    report: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn default_selections_path() -> Option<PathBuf> {
    let mut base = dirs::config_dir().or_else(dirs::data_dir)?;
    base.push("HunterbornExtender");
    base.push("selections.json");
    Some(base)
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(args: Args) -> Result<()> {
    let cache = load_records(&args.records)?;
    let mut plugins = load_plugin_dir(&args.plugins)?;
    let lists = match &args.lists {
        Some(path) => load_exclusion_lists(path)?,
        None => ExclusionLists::default(),
    };

    let previous_path = args.previous.clone().or_else(default_selections_path);
    let previous = match &previous_path {
        Some(path) => load_selections(path)?,
        None => Vec::new(),
    };

    let output_path = args
        .output
        .clone()
        .or_else(default_selections_path)
        .ok_or_else(|| {
            ExtenderError::Config(
                "No --output given and no user config directory to default to".to_string(),
            )
        })?;

    let selections = make_heuristic_selections(
        cache.npcs(),
        &mut plugins,
        &previous,
        &lists,
        &cache,
        args.debug,
    )?;

    save_selections(&output_path, &merge_selections(selections.clone(), &previous))?;

    let report = selection_report(&selections);
    if let Some(report_path) = &args.report {
        write_report(report_path, &report)?;
    }

    log::info!(
        "Wrote {} selections to {}",
        selections.len(),
        output_path.display()
    );
    if args.debug {
        print!("{}", report);
    }

    Ok(())
}

fn write_report(path: &Path, report: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, report)?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
