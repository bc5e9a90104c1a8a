use clap::Parser;
use log::*;

mod cart;
mod command_def;
mod command_handler;

use command_def::Arguments;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    if let Err(e) = command_handler::handle_command(cli.command).await {
        error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
