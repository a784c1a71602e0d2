mod cli;

use clap::Parser;
use cli::Cli;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::runtime::ConfigErrors;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::error::Error;

/// Stderr only config used when `log4rs.yml` can't be loaded.
fn fallback_log_config() -> Result<Config, ConfigErrors> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();
    Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Info))
}

/// Logging from `log4rs.yml`, or plain stderr when it can't be loaded.
fn init_logging() {
    if let Err(e) = log4rs::init_file("log4rs.yml", Default::default()) {
        match fallback_log_config().map(log4rs::init_config) {
            Ok(Ok(_)) => log::warn!("log4rs.yml not loaded ({e}), logging to stderr"),
            Ok(Err(init_err)) => {
                eprintln!("log4rs.yml not loaded ({e}), no fallback logger: {init_err}")
            }
            Err(config_err) => {
                eprintln!("log4rs.yml not loaded ({e}), no fallback logger: {config_err}")
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs, the work is in cli and the lib
    let cli = Cli::parse();
    init_logging();
    dotenv::dotenv().ok();
    log::info!("#Start main()");

    cli.run().await.map_err(|e| {
        log::error!("{e}");
        e
    })
}
