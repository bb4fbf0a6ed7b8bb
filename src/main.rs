//! Sprig - incremental render planning for git-backed blogs.

mod change;
mod cli;
mod config;
mod content;
mod context;
mod logger;
mod plan;
mod publish;
mod store;
mod utils;
mod workflow;

use anyhow::Result;
use change::{ChangeSource, GitChangeSource, JsonBatchSource};
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use context::RunContext;
use logger::{Logger, Verbosity};
use plan::RenderPlan;
use std::path::Path;
use workflow::{RunSummary, Workflow};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let ctx = RunContext::new(&config, Logger::new(verbosity(&cli)));
    if !config.config_path.is_file() {
        debug!(ctx; "config"; "`{}` not found, using defaults", config.config_path.display());
    }

    match &cli.command {
        Commands::Rebuild => {
            let summary = Workflow::new(ctx).rebuild()?;
            report(&ctx, &summary);
        }
        Commands::Update { batch } => {
            let source = change_source(&config, batch.as_deref());
            let summary = Workflow::new(ctx).update(&*source)?;
            report(&ctx, &summary);
        }
        Commands::Plan { batch, rebuild } => {
            let source = (!rebuild).then(|| change_source(&config, batch.as_deref()));
            let (mode, plan) = Workflow::new(ctx).plan(source.as_deref())?;
            log!(ctx; "plan"; "{mode:?}");
            print_plan(&ctx, &plan);
        }
    }

    Ok(())
}

/// Load and validate configuration from CLI arguments.
/// A missing config file means built-in defaults.
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}

const fn verbosity(cli: &Cli) -> Verbosity {
    match (cli.verbose, cli.quiet) {
        (true, _) => Verbosity::Verbose,
        (_, true) => Verbosity::Quiet,
        _ => Verbosity::Normal,
    }
}

fn change_source(config: &SiteConfig, batch: Option<&Path>) -> Box<dyn ChangeSource> {
    match batch {
        Some(path) => Box::new(JsonBatchSource::new(path)),
        None => Box::new(GitChangeSource::new(config.get_root())),
    }
}

fn report(ctx: &RunContext<'_>, summary: &RunSummary) {
    log!(ctx; "done"; "{:?}: {} posts, {} rendered, {} deleted",
        summary.mode, summary.posts, summary.rendered, summary.deleted);
}

fn print_plan(ctx: &RunContext<'_>, plan: &RenderPlan) {
    if plan.is_empty() {
        log!(ctx; "plan"; "nothing to do");
        return;
    }
    let build = &ctx.config.build;
    for entry in &plan.to_render {
        log!(ctx; "render"; "{} -> {}", entry.target, entry.target.url_parts(build).join("/"));
    }
    for target in &plan.to_delete {
        log!(ctx; "delete"; "{} -> {}", target, target.url_parts(build).join("/"));
    }
}
