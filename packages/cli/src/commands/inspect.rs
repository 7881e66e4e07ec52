use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::EditSession;
use pagecraft_model::{EditorKind, Registry};
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Page file or directory (defaults to the configured pages directory)
    pub input: Option<PathBuf>,
}

pub fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let input = args.input.unwrap_or_else(|| config.get_pages_dir(cwd));

    if input.is_file() {
        inspect_page(&input, &config)
    } else if input.is_dir() {
        let pages = find_pages(&input);
        println!("🔎 Found {} pages in {}", pages.len(), input.display());

        for page in pages {
            println!();
            if let Err(e) = inspect_page(&page, &config) {
                eprintln!("  {} {} - {}", "✗".red(), page.display(), e);
            }
        }
        Ok(())
    } else {
        Err(anyhow!("Input path does not exist: {}", input.display()))
    }
}

fn inspect_page(path: &Path, config: &Config) -> Result<()> {
    let mut session =
        EditSession::load_with_key(path, &config.page_key_for(path), config.registry())?;

    println!(
        "{} {} ({} blocks)",
        "📄".bright_blue(),
        path.display().to_string().bright_white().bold(),
        session.document().len()
    );

    let blocks: Vec<_> = session
        .document()
        .iter()
        .map(|b| (b.uid().clone(), b.block_type().to_string()))
        .collect();

    for (index, (uid, block_type)) in blocks.iter().enumerate() {
        let registry = session.registry();
        let label = match registry.editor_for(block_type) {
            EditorKind::Unknown => "unknown block type".red().to_string(),
            _ => registry
                .describe(block_type)
                .map(|d| d.label.clone())
                .unwrap_or_default(),
        };
        println!(
            "  {:>2}. {:<10} {} {}",
            index,
            block_type.cyan(),
            uid.as_str().dimmed(),
            label
        );

        for key in list_keys(registry, block_type) {
            let rows = session.list_rows(uid, &key);
            println!("      {} ({} rows)", key.bright_white(), rows.len());
            for row in rows {
                println!("        {} {}", row.id.as_str().dimmed(), summary(&row.value));
            }
        }
    }

    Ok(())
}

fn list_keys(registry: &Registry, block_type: &str) -> Vec<String> {
    registry
        .describe(block_type)
        .map(|d| d.lists.iter().map(|l| l.key.clone()).collect())
        .unwrap_or_default()
}

/// First string field of a row, for display
fn summary(row: &Value) -> String {
    row.as_object()
        .and_then(|fields| fields.values().find_map(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| row.to_string())
}

fn find_pages(dir: &Path) -> Vec<PathBuf> {
    let mut pages: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map(|ext| ext == "json").unwrap_or(false))
        .map(|e| e.path().to_path_buf())
        .collect();
    pages.sort();
    pages
}
