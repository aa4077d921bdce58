mod bootstrap;
mod commands;

use anyhow::Result;
use shop_core::settings::{Command, Settings};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("shop-tools v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Group: {}, price rule: {}, timezone: {}",
        settings.group,
        settings.price_rule,
        settings.timezone
    );

    match settings.effective_command() {
        Command::Report { date, file, format } => {
            commands::report(&settings, date, file, format)?;
        }
        Command::Batch { format } => {
            commands::batch(&settings, format)?;
        }
        Command::Prototypes {
            dataset,
            features,
            out,
        } => {
            commands::prototypes(&dataset, &features, &out)?;
        }
        Command::Classify {
            folder,
            features,
            prototypes,
            alpha,
            out,
        } => {
            bootstrap::ensure_parent_dir(&out)?;
            commands::classify(&folder, &features, &prototypes, alpha, &out)?;
        }
    }

    Ok(())
}
