//! bit-user-callback - Back In Time user-callback
//!
//! Back In Time runs `<config dir>/backintime/user-callback` with the profile
//! id, the profile name and a reason code. On "mount all necessary drives"
//! for the configured profile, while connected to the configured wireless
//! network, the backup server is woken and polled until ready.

use anyhow::{Context, Result};
use bit_user_callback::{logging, setup, CallbackConfig, CallbackError, Invocation, Orchestrator, Outcome};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

const LONG_ABOUT: &str = "\
If invoked by Back In Time, user-callback accepts three or more arguments:

* the profile id (1=Main Profile, ...)
* the profile name
* the reason code

user-callback ignores the profile id and only acts for reason 7
(mount all necessary drives).

Operation is configured via user-callback.json in the Back In Time config
directory. A default configuration is written by invoking with --genconf.

See https://github.com/bit-team/user-callback for the reason codes.";

#[derive(Debug, Parser)]
#[command(name = "bit-user-callback", version, about = "Back In Time user-callback waking a backup server")]
#[command(long_about = LONG_ABOUT)]
struct Cli {
    /// Generate a configuration file
    #[arg(long)]
    genconf: bool,

    /// Create a symlink to the executable in the Back In Time config directory
    #[arg(long)]
    install: bool,

    /// Arguments passed by Back In Time
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.install || cli.genconf {
        return match run_setup(&cli).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fatal(&format!("{e:#}")),
        };
    }

    let config = match CallbackConfig::load().await {
        Ok(config) => config,
        Err(e) => {
            logging::init(false, None).ok();
            return fatal(&CallbackError::from(e).to_string());
        }
    };

    if let Err(e) = logging::init(config.verbose, config.log_file.as_deref()) {
        logging::init(false, None).ok();
        return fatal(&format!("{e:#}"));
    }

    if config.verbose {
        info!("received arguments: {:?}", cli.args);
    }

    match run_callback(config, &cli.args).await {
        Ok(Outcome::Ready(report)) => {
            info!("server ready (wake sent: {}, {:?})", report.wake_sent, report.elapsed);
            ExitCode::SUCCESS
        }
        Ok(Outcome::NotPresent { .. } | Outcome::NotApplicable) => ExitCode::SUCCESS,
        Err(e) => fatal(&e.to_string()),
    }
}

async fn run_callback(config: CallbackConfig, args: &[String]) -> Result<Outcome, CallbackError> {
    let invocation = Invocation::from_args(args)?;
    let orchestrator = Orchestrator::from_config(config)?;
    orchestrator.run(&invocation).await
}

async fn run_setup(cli: &Cli) -> Result<()> {
    logging::init(false, None)?;
    let dir = CallbackConfig::config_dir().context("could not determine config directory")?;

    if cli.install {
        let link = setup::install_link(&dir)?;
        info!("installed callback link {}", link.display());
    }
    if cli.genconf {
        let path = CallbackConfig::config_file_path()?;
        setup::generate_config(&path).await?;
        println!("wrote configuration file to {:?}", path);
    }
    Ok(())
}

fn fatal(message: &str) -> ExitCode {
    error!("{}", message);
    ExitCode::FAILURE
}
