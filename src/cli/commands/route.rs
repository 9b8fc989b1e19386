use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::gate::{classify, rewrite_demo_path, PathClass};

#[derive(Subcommand)]
pub enum RouteCommands {
    #[command(about = "Classify a path as public, demo or protected")]
    Classify {
        #[arg(help = "Request path, e.g. /demo/overview")]
        path: String,
    },

    #[command(about = "Show the canonical page a demo path is routed to")]
    Rewrite {
        #[arg(help = "Demo path, e.g. /demo/overview")]
        path: String,
    },
}

pub async fn handle(cmd: RouteCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let rules = &config::config().routing;

    match cmd {
        RouteCommands::Classify { path } => {
            let class = classify(&path, rules);
            let routed_to = match class {
                PathClass::Demo => rewrite_demo_path(&path, rules),
                PathClass::Public | PathClass::Protected => path.clone(),
            };
            output_success(
                &output_format,
                &format!("{} is {}", path, class.as_str()),
                Some(json!({
                    "path": path,
                    "class": class,
                    "routed_to": routed_to,
                })),
            )
        }
        RouteCommands::Rewrite { path } => {
            let class = classify(&path, rules);
            if class != PathClass::Demo {
                anyhow::bail!("{} is {}, not a demo path; it is never rewritten", path, class.as_str());
            }
            let canonical = rewrite_demo_path(&path, rules);
            output_success(
                &output_format,
                &format!("{} -> {}", path, canonical),
                Some(json!({ "path": path, "canonical": canonical })),
            )
        }
    }
}
