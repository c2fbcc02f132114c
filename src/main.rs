// src/main.rs
use env_logger::Builder;
use ivr_trading::api;
use ivr_trading::config::Config;
use ivr_trading::db::{self, AccountStore, ScyllaAccountStore};
use ivr_trading::quotes::{AlphaVantageClient, StockQuoter};
use log::{error, info, LevelFilter};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    Builder::new()
        .filter_level(LevelFilter::Debug)
        .format_timestamp_secs()
        .init();
    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    let session = match db::init("127.0.0.1:9042").await {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return;
        }
    };
    info!("Connected to database...");

    let store: Arc<dyn AccountStore> = Arc::new(ScyllaAccountStore::new(session));
    let quoter: Arc<dyn StockQuoter> = Arc::new(AlphaVantageClient::new(&config.alpha_vantage_api_key));

    info!(
        "Starting the voice trading line on {}...",
        config.twilio_phone_number
    );

    let routes = api::routes(store, quoter);

    info!("Server running on http://127.0.0.1:3030");
    warp::serve(routes).run(([127, 0, 0, 1], 3030)).await;
}
