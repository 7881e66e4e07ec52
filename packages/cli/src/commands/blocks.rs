use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_model::BlockDescriptor;

#[derive(Args, Debug)]
pub struct BlocksArgs {
    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn blocks(args: BlocksArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = config.registry();

    if args.format == "json" {
        let descriptors: Vec<&BlockDescriptor> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    println!("{} {} block types", "🧱".bright_blue(), registry.len());
    println!();

    for descriptor in registry.iter() {
        println!(
            "  {:<12} {:<24} {}",
            descriptor.block_type.bright_white().bold(),
            descriptor.label,
            descriptor.thumbnail.dimmed()
        );

        for list in &descriptor.lists {
            println!(
                "  {:<12} {} {} keyed by {}",
                "",
                "↳".dimmed(),
                list.key.cyan(),
                list.fingerprint.join(" + ")
            );
        }
    }

    Ok(())
}
