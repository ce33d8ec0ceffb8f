//! `segwayctl config`

use anyhow::Result;
use segway_core::{ConfigFormat, SegwayConfig};
use std::path::Path;
use tracing::debug;

use crate::commands::ConfigCommands;
use crate::error::CliError;
use crate::output;

pub fn execute(cmd: &ConfigCommands, json: bool) -> Result<()> {
    match cmd {
        ConfigCommands::Default { format, output } => {
            let config = SegwayConfig::default();
            match output {
                Some(path) => {
                    let format = format.map_or_else(|| ConfigFormat::from_path(path), Into::into);
                    config
                        .save_to_path_with_format(path, format)
                        .map_err(CliError::from)?;
                    output::print_success(
                        &format!("Default configuration written to {}", path.display()),
                        json,
                    );
                }
                None => {
                    let format = format.map_or(ConfigFormat::Json, Into::into);
                    let rendered = config.to_string_with_format(format).map_err(CliError::from)?;
                    print!("{rendered}");
                    if !rendered.ends_with('\n') {
                        println!();
                    }
                }
            }
            Ok(())
        }
        ConfigCommands::Validate { path } => validate(path, json),
    }
}

fn validate(path: &Path, json: bool) -> Result<()> {
    if !path.exists() {
        return Err(CliError::ConfigNotFound(path.to_path_buf()).into());
    }

    let format = ConfigFormat::from_path(path);
    debug!(path = %path.display(), ?format, "validating configuration");

    let config = SegwayConfig::load_from_path(path).map_err(CliError::from)?;
    output::print_config_valid(path, &config, json);
    Ok(())
}
