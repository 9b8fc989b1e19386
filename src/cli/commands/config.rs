use clap::Subcommand;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Print the configuration resolved from APP_ENV and environment overrides")]
    Show,
}

pub async fn handle(cmd: ConfigCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let app_config = config::config();
            output_success(
                &output_format,
                &format!("{:?} configuration", app_config.environment),
                Some(serde_json::to_value(app_config)?),
            )
        }
    }
}
