use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{EditSession, Mutation};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Page file to edit
    pub page: PathBuf,

    /// JSON array of mutations
    pub script: PathBuf,

    /// Write the result here instead of back to the page
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut session = open_session(&args.page, &config)?;

    let source = fs::read_to_string(&args.script)
        .with_context(|| format!("Cannot read script {}", args.script.display()))?;
    let script: Vec<Mutation> = serde_json::from_str(&source)
        .with_context(|| format!("Invalid mutation script {}", args.script.display()))?;

    let total = script.len();
    debug!(script = %args.script.display(), mutations = total, "Loaded mutation script");
    let changed = session.apply_all(script, "Apply script")?;

    if args.stdout {
        println!("{}", session.document().to_json()?);
        return Ok(());
    }

    let target = args.out.unwrap_or_else(|| args.page.clone());
    session.save_as(&target)?;
    info!(path = %target.display(), changed, "Applied script");

    println!(
        "  {} {} mutations ({} changed) → {}",
        "✓".green(),
        total,
        changed,
        target.display()
    );

    Ok(())
}

fn open_session(page: &Path, config: &Config) -> Result<EditSession> {
    let session = EditSession::load_with_key(page, &config.page_key_for(page), config.registry())
        .with_context(|| format!("Cannot load page {}", page.display()))?;
    Ok(session.with_undo_levels(config.undo_levels))
}
