extern crate dotenv;

mod config;
mod db;
mod smoke;

use std::io;

use dotenv::dotenv;

use config::Config;
use db::RestClient;

fn main() {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    // outcomes are reported as text only, the exit status stays 0
    match smoke::run(config, RestClient::connect, &mut out) {
        Ok(outcome) => log::info!("smoke test finished: {:?}", outcome),
        Err(error) => log::error!("could not write report: {}", error),
    }
}
