use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_model::{Document, Registry};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Pages directory
    #[arg(short, long, default_value = "pages")]
    pub pages_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!(
        "{}",
        "📝 Initializing Pagecraft project...".bright_blue().bold()
    );

    // Create pages directory if it doesn't exist
    let pages_dir = PathBuf::from(cwd).join(&args.pages_dir);
    if !pages_dir.exists() {
        fs::create_dir_all(&pages_dir)?;
        println!("  {} Created {}/", "✓".green(), args.pages_dir);
    }

    // Create example page
    let example_file = pages_dir.join("home.json");
    if !example_file.exists() {
        let registry = Registry::builtin();
        let page = Document::new("home")
            .add(&registry, "hero")?
            .add(&registry, "faq")?
            .add(&registry, "contact")?;
        fs::write(&example_file, page.to_json()?)?;
        println!("  {} Created home.json", "✓".green());
    }

    let config = Config {
        pages_dir: args.pages_dir.clone(),
        ..Config::default()
    };

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: pagecraft inspect {}/home.json", args.pages_dir);
    println!("  2. Run: pagecraft blocks");

    Ok(())
}
