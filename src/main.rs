use clap::Parser;
use color_eyre::Result;
use pitch_tank_config::Args;
use pitch_tank_console::{
    init_errors,
    logging,
    App,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    logging::log_init()?;

    App::new(Args::parse())?.run().await
}
