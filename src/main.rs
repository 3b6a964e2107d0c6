use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use stardust::{Card, CardConfig};

/// A particle tree greeting card that scatters into a starfield.
#[derive(Parser)]
#[command(name = "stardust")]
#[command(version, about, long_about = None)]
struct Args {
    /// Card configuration (JSON). Defaults apply when omitted.
    #[arg(long, value_name = "CARD.JSON")]
    config: Option<PathBuf>,

    /// Where photos and the greeting are kept between runs.
    #[arg(long, value_name = "KEEPSAKE.JSON", default_value = "stardust.json")]
    store: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match args.config {
        Some(path) => match CardConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("could not load {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => CardConfig::default(),
    };

    match Card::new().with_config(config).with_store_path(args.store).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
