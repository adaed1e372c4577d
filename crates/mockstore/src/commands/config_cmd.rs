//! Config subcommand handlers.

use mockstore_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand};
use crate::error::CliError;
use crate::output;

use super::Context;

/// Format the resolved config as TOML, with the file location as a header.
fn format_config(cfg: &Config, ctx: &Context) -> Result<String, CliError> {
    let body = toml::to_string_pretty(cfg).map_err(|e| CliError::ConfigWrite(e.to_string()))?;
    let header = output::muted(&format!("# {}", ctx.config_path.display()), ctx.color);
    Ok(format!("{header}\n{}", body.trim_end()))
}

pub fn handle(args: ConfigArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&ctx.config_path.display().to_string(), ctx.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let out = match output::serialized(ctx.output, &ctx.config)? {
                Some(text) => text,
                None => format_config(&ctx.config, ctx)?,
            };
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = &ctx.config_path;
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            config::save_config(&Config::default(), path)?;
            tracing::info!(path = %path.display(), "config written");
            if !ctx.quiet {
                eprintln!("Config written to {}", path.display());
            }
            Ok(())
        }
    }
}
