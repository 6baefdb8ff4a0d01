mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use fs_err as fs;
use serde_json::json;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use wirepick_domain::ResolveContext;
use wirepick_index::{load_repositories, parse_index, repository_name};
use wirepick_types::{CapabilityRef, Requirement, Resource, parse_header};

#[derive(Debug, Parser)]
#[command(
    name = "wirepick",
    version,
    about = "Inspect resolver candidate selection for a run description."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List ranked providers for a requirement clause.
    Providers(ClauseArgs),
    /// Print whether a requirement clause is effective for this run.
    Effective(ClauseArgs),
    /// List the resources every resolution must contain.
    Mandatory(RunArgs),
    /// Print the selected framework resource, or `none`.
    Framework(RunArgs),
}

#[derive(Debug, Parser)]
struct RunArgs {
    /// Run description (TOML). Without one, defaults apply.
    #[arg(long)]
    run: Option<Utf8PathBuf>,

    /// Directory of `*.index.json` files, added after the run file's repositories.
    #[arg(long)]
    repo_dir: Option<Utf8PathBuf>,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct ClauseArgs {
    /// Requirement clause, e.g. `osgi.wiring.package;filter:='(osgi.wiring.package=org.example)'`.
    clause: String,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Providers(args) => cmd_providers(args),
        Command::Effective(args) => cmd_effective(args),
        Command::Mandatory(args) => cmd_mandatory(args),
        Command::Framework(args) => cmd_framework(args),
    }
}

fn build_context(args: &RunArgs) -> anyhow::Result<ResolveContext> {
    let run_file = match &args.run {
        Some(path) => config::load_run(path).context("load run description")?,
        None => config::RunFile::default(),
    };

    let mut builder = ResolveContext::builder(run_file.run);
    for entry in &run_file.repository {
        let name = entry
            .name
            .clone()
            .unwrap_or_else(|| repository_name(&entry.index));
        let text = fs::read_to_string(&entry.index)
            .with_context(|| format!("read index {}", entry.index))?;
        let repo = parse_index(&name, &text).with_context(|| format!("load index {}", entry.index))?;
        builder = builder.repository(Arc::new(repo));
    }

    if let Some(dir) = &args.repo_dir {
        for loaded in load_repositories(dir).with_context(|| format!("scan {}", dir))? {
            let repo = loaded
                .repository
                .with_context(|| format!("load index {}", loaded.path))?;
            builder = builder.repository(Arc::new(repo));
        }
    }

    let ctx = builder.build().context("build resolve context")?;
    debug!(repositories = ?ctx.repository_names(), "resolve context ready");
    Ok(ctx)
}

fn parse_requirement(clause: &str) -> anyhow::Result<Requirement> {
    let clauses = parse_header(clause).with_context(|| format!("parse clause '{clause}'"))?;
    match clauses.as_slice() {
        [one] => Ok(Requirement::from_clause(one)),
        _ => anyhow::bail!("expected exactly one requirement clause, got {}", clauses.len()),
    }
}

fn cmd_providers(args: ClauseArgs) -> anyhow::Result<()> {
    let requirement = parse_requirement(&args.clause)?;
    let ctx = build_context(&args.run)?;
    let providers = ctx.find_providers(&requirement).context("find providers")?;

    match args.run.format {
        OutputFormat::Text => {
            if providers.is_empty() {
                println!("no providers");
            }
            for (idx, cap) in providers.iter().enumerate() {
                println!("{:>3}. {}", idx + 1, provider_line(cap));
            }
        }
        OutputFormat::Json => {
            let out: Vec<_> = providers.iter().map(provider_json).collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn cmd_effective(args: ClauseArgs) -> anyhow::Result<()> {
    let requirement = parse_requirement(&args.clause)?;
    let ctx = build_context(&args.run)?;
    let effective = ctx.is_effective(&requirement);

    match args.run.format {
        OutputFormat::Text => println!("{effective}"),
        OutputFormat::Json => println!("{}", json!({ "effective": effective })),
    }
    Ok(())
}

fn cmd_mandatory(args: RunArgs) -> anyhow::Result<()> {
    let ctx = build_context(&args)?;
    let resources = ctx.mandatory_resources().context("compute mandatory resources")?;

    match args.format {
        OutputFormat::Text => {
            for resource in &resources {
                println!("{}", resource_line(resource));
            }
        }
        OutputFormat::Json => {
            let out: Vec<_> = resources.iter().map(|r| resource_json(r)).collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn cmd_framework(args: RunArgs) -> anyhow::Result<()> {
    let ctx = build_context(&args)?;
    let framework = ctx.framework_resource().context("select framework")?;

    match (args.format, framework) {
        (OutputFormat::Text, Some(fw)) => println!("{}", resource_line(&fw)),
        (OutputFormat::Text, None) => println!("none"),
        (OutputFormat::Json, fw) => {
            let out = fw.map(|r| resource_json(&r)).unwrap_or(serde_json::Value::Null);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn resource_line(resource: &Resource) -> String {
    match resource.location() {
        Some(location) => format!("{resource} ({location})"),
        None => resource.to_string(),
    }
}

fn provider_line(cap: &CapabilityRef) -> String {
    format!(
        "{} [{}]",
        resource_line(cap.resource()),
        cap.capability().namespace()
    )
}

fn resource_json(resource: &Resource) -> serde_json::Value {
    json!({
        "identity": resource.identity(),
        "version": resource.version().to_string(),
        "location": resource.location(),
    })
}

fn provider_json(cap: &CapabilityRef) -> serde_json::Value {
    let mut value = resource_json(cap.resource());
    value["namespace"] = json!(cap.capability().namespace());
    value
}
