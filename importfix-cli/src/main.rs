mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::{ConfigMerger, OfferOverrides};
use fs_err as fs;
use importfix_core::SymbolSearch;
use importfix_core::adapters::{FsSolutionLoader, FsWritePort, fs_services};
use importfix_core::index::JsonSymbolIndex;
use importfix_core::pipeline::{
    OfferOutcome, OfferRequest, ToolError, run_apply, run_offer, select_fix,
};
use importfix_core::ports::SolutionSource;
use importfix_core::settings::{ApplySettings, OfferSettings};
use importfix_render::{render_apply_md, render_offer_md};
use importfix_solution::Solution;
use importfix_types::offer::ToolInfo;
use serde::Serialize;
use std::collections::BTreeMap;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "importfix",
    version,
    about = "Offer and apply add-import fixes for unbound names."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List candidate fixes for a name. Nothing is resolved.
    Offer(OfferArgs),
    /// Re-check and apply one offered fix (default: dry-run).
    Apply(ApplyArgs),
    /// List the symbol sources found in the index.
    ListSources(ListSourcesArgs),
}

#[derive(Debug, Parser)]
struct QueryArgs {
    /// Solution root containing importfix-solution.json (default: current directory).
    #[arg(long, default_value = ".")]
    solution: Utf8PathBuf,

    /// Document path relative to the solution root.
    #[arg(long)]
    document: Utf8PathBuf,

    /// The unbound name.
    #[arg(long)]
    symbol: String,

    /// 1-based line the name occurs on (default: first occurrence).
    #[arg(long)]
    line: Option<u32>,

    /// Maximum number of fixes to offer.
    #[arg(long)]
    max_fixes: Option<usize>,

    /// Do not offer fixes that add a project reference.
    #[arg(long, default_value_t = false)]
    no_projects: bool,

    /// Do not offer fixes that add an assembly reference.
    #[arg(long, default_value_t = false)]
    no_assemblies: bool,

    /// Do not offer fixes that add a package reference.
    #[arg(long, default_value_t = false)]
    no_packages: bool,

    /// Sort new imports purely alphabetically.
    #[arg(long, default_value_t = false)]
    no_system_first: bool,

    /// Extra directory to search for assemblies and packages (repeatable).
    #[arg(long = "search-path")]
    search_paths: Vec<Utf8PathBuf>,

    /// Write report artifacts to this directory as well.
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct OfferArgs {
    #[command(flatten)]
    query: QueryArgs,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct ApplyArgs {
    #[command(flatten)]
    query: QueryArgs,

    /// Fix to apply: 1-based index from `offer` or an id prefix.
    #[arg(long)]
    fix: String,

    /// Write changes to disk. If omitted, runs a dry-run and prints the patch.
    #[arg(long, default_value_t = false)]
    write: bool,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct ListSourcesArgs {
    /// Solution root containing importfix-symbols.json (default: current directory).
    #[arg(long, default_value = ".")]
    solution: Utf8PathBuf,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

fn real_main() -> Result<(), ToolError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Offer(args) => cmd_offer(args),
        Command::Apply(args) => cmd_apply(args),
        Command::ListSources(args) => cmd_list_sources(args),
    }
}

fn offer_settings(query: &QueryArgs) -> anyhow::Result<OfferSettings> {
    let file_config =
        config::load_or_default(&query.solution).context("load importfix.toml config")?;
    let overrides = OfferOverrides {
        max_fixes: query.max_fixes,
        no_projects: query.no_projects,
        no_assemblies: query.no_assemblies,
        no_packages: query.no_packages,
        no_system_first: query.no_system_first,
        search_paths: query.search_paths.clone(),
    };
    let settings =
        ConfigMerger::new(file_config).merge_offer_args(query.solution.clone(), &overrides);
    debug!("merged config: {:?}", settings);
    Ok(settings)
}

fn offer(
    settings: &OfferSettings,
    query: &QueryArgs,
    cancel: &CancellationToken,
) -> Result<(Solution, OfferOutcome), ToolError> {
    let solution = FsSolutionLoader::new(query.solution.clone())
        .load_solution()
        .with_context(|| format!("load solution from {}", query.solution))?;
    let index = JsonSymbolIndex::load_or_empty(&query.solution)
        .with_context(|| format!("load symbol index from {}", query.solution))?;
    let request = OfferRequest {
        document: query.document.clone(),
        symbol: query.symbol.clone(),
        line: query.line,
    };
    let outcome = run_offer(
        settings,
        &solution,
        index.searches(),
        fs_services(settings),
        &request,
        tool_info(),
        cancel,
    )?;
    Ok((solution, outcome))
}

fn cmd_offer(args: OfferArgs) -> Result<(), ToolError> {
    let settings = offer_settings(&args.query)?;
    let cancel = CancellationToken::new();
    let (_, outcome) = offer(&settings, &args.query, &cancel)?;

    if let Some(out_dir) = &args.query.out_dir {
        fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir))?;
        write_json(&out_dir.join("offer.json"), &outcome.report)?;
        fs::write(out_dir.join("offer.md"), render_offer_md(&outcome.report))
            .with_context(|| format!("write {}", out_dir.join("offer.md")))?;
        info!("wrote offer to {}", out_dir);
    }

    match args.format {
        OutputFormat::Text => print!("{}", render_offer_md(&outcome.report)),
        OutputFormat::Json => println!("{}", to_json(&outcome.report)?),
    }
    Ok(())
}

fn cmd_apply(args: ApplyArgs) -> Result<(), ToolError> {
    let settings = ApplySettings {
        offer: offer_settings(&args.query)?,
        dry_run: !args.write,
    };
    let cancel = CancellationToken::new();
    let (solution, offered) = offer(&settings.offer, &args.query, &cancel)?;
    let fix = select_fix(&offered.fixes, &args.fix).ok_or_else(|| {
        ToolError::NotApplicable(format!(
            "no offered fix matches '{}' ({} offered)",
            args.fix,
            offered.fixes.len()
        ))
    })?;
    debug!(fix = %fix.id(), title = %fix.describe().title, "selected fix");

    let outcome = run_apply(&settings, &solution, fix, &FsWritePort, tool_info(), &cancel)?;

    if let Some(out_dir) = &args.query.out_dir {
        fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir))?;
        write_json(&out_dir.join("apply.json"), &outcome.report)?;
        fs::write(out_dir.join("apply.md"), render_apply_md(&outcome.report))
            .with_context(|| format!("write {}", out_dir.join("apply.md")))?;
        fs::write(out_dir.join("patch.diff"), &outcome.patch)
            .with_context(|| format!("write {}", out_dir.join("patch.diff")))?;
        info!("wrote apply artifacts to {}", out_dir);
    }

    match args.format {
        OutputFormat::Text => {
            print!("{}", render_apply_md(&outcome.report));
            if !outcome.patch.is_empty() {
                println!("\n## Patch\n");
                print!("{}", outcome.patch);
            }
        }
        OutputFormat::Json => println!("{}", to_json(&outcome.report)?),
    }

    if outcome.not_applicable {
        return Err(ToolError::NotApplicable(
            outcome
                .report
                .message
                .unwrap_or_else(|| "fix no longer applies".to_string()),
        ));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct SourceSummary {
    provider: String,
    entries: usize,
    origins: BTreeMap<&'static str, usize>,
}

fn cmd_list_sources(args: ListSourcesArgs) -> Result<(), ToolError> {
    let index = JsonSymbolIndex::load_or_empty(&args.solution)
        .with_context(|| format!("load symbol index from {}", args.solution))?;

    let sources: Vec<SourceSummary> = index
        .sources()
        .iter()
        .map(|source| {
            let mut origins = BTreeMap::new();
            for entry in source.entries() {
                *origins.entry(entry.origin.as_str()).or_insert(0) += 1;
            }
            SourceSummary {
                provider: source.provider().as_str().to_string(),
                entries: source.entries().len(),
                origins,
            }
        })
        .collect();

    match args.format {
        OutputFormat::Text => {
            if sources.is_empty() {
                println!("No symbol sources found.");
            } else {
                println!("{:<20} {:>8}  ORIGINS", "PROVIDER", "ENTRIES");
                println!("{}", "-".repeat(50));
                for s in &sources {
                    let origins: Vec<String> =
                        s.origins.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                    println!("{:<20} {:>8}  {}", s.provider, s.entries, origins.join(", "));
                }
            }
        }
        OutputFormat::Json => println!("{}", to_json(&sources)?),
    }
    Ok(())
}

fn to_json<T: Serialize>(v: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(v).context("serialize json")
}

fn write_json<T: Serialize>(path: &Utf8Path, v: &T) -> anyhow::Result<()> {
    let s = to_json(v)?;
    fs::write(path, s).with_context(|| format!("write {}", path))?;
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "importfix".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
