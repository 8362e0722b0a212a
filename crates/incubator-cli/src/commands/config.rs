//! Config command implementation.

use anyhow::{Result, bail};

use crate::cli::ConfigAction;
use crate::config::Config;
use crate::context::AppContext;
use crate::style;
use crate::util::write_output;

pub fn cmd_config(ctx: &AppContext, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let content = toml::to_string_pretty(&ctx.config)?;
            write_output(ctx.output(), &content)?;
        }
        ConfigAction::Path => {
            println!("{}", ctx.config_path.display());
        }
        ConfigAction::Init { force } => {
            if ctx.config_path.exists() && !force {
                bail!(
                    "Config file already exists at {}; use --force to overwrite",
                    ctx.config_path.display()
                );
            }
            Config::default().save(&ctx.config_path)?;
            if !ctx.quiet {
                println!(
                    "{}",
                    style::format_success(
                        &format!("Wrote {}", ctx.config_path.display()),
                        ctx.no_color
                    )
                );
            }
        }
    }
    Ok(())
}
