// src/api.rs
//
// Webhook handlers driving the call flow. Each inbound POST from the
// telephony provider carries the caller's last input; the handler answers
// with a TwiML document that either speaks a result or gathers the next
// input and names the callback that continues the flow. No call state is
// kept server-side between webhooks.

use crate::db::{AccountStore, StoreError};
use crate::error::StoreFailure;
use crate::models::CallerInput;
use crate::quotes::StockQuoter;
use crate::twiml::{Gather, VoiceResponse};
use log::{error, info};
use std::collections::HashMap;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

const WELCOME_PROMPT: &str = "Welcome to Stock Trading. Press 1 or say 'stock' to inquire about a stock price. Press 2 or say 'buy' to buy a stock.";
const QUOTE_SYMBOL_PROMPT: &str =
    "Please enter the stock symbol using the keypad or say it out loud.";
const BUY_SYMBOL_PROMPT: &str =
    "Please enter the stock symbol you want to buy using the keypad or say it out loud.";
const INSUFFICIENT_FUNDS: &str = "Sorry, you don't have sufficient funds for this purchase.";

pub fn routes(
    store: Arc<dyn AccountStore>,
    quoter: Arc<dyn StockQuoter>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let ivr = warp::path("ivr").and(warp::post()).and_then(ivr_handler);

    let menu = warp::path("menu")
        .and(warp::post())
        .and(warp::body::form())
        .and_then(menu_handler);

    let stock_price = warp::path("stock-price")
        .and(warp::post())
        .and(warp::body::form())
        .and(with_quoter(quoter.clone()))
        .and_then(stock_price_handler);

    let buy_stock = warp::path("buy-stock")
        .and(warp::post())
        .and(warp::body::form())
        .and(with_quoter(quoter))
        .and(with_store(store))
        .and_then(buy_stock_handler);

    ivr.or(menu).or(stock_price).or(buy_stock)
}

fn with_store(
    store: Arc<dyn AccountStore>,
) -> impl Filter<Extract = (Arc<dyn AccountStore>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || store.clone())
}

fn with_quoter(
    quoter: Arc<dyn StockQuoter>,
) -> impl Filter<Extract = (Arc<dyn StockQuoter>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || quoter.clone())
}

fn xml(response: &VoiceResponse) -> warp::reply::WithHeader<String> {
    warp::reply::with_header(response.render(), "content-type", "text/xml")
}

fn say(text: &str) -> VoiceResponse {
    let mut response = VoiceResponse::new();
    response.say(text);
    response
}

/// Entry point of the call. Greets the caller and gathers a one-digit (or
/// spoken) menu choice for `/menu`.
async fn ivr_handler() -> Result<impl Reply, Rejection> {
    let mut response = VoiceResponse::new();
    response.gather(Gather::new("/menu", 1).say(WELCOME_PROMPT));
    Ok(xml(&response))
}

/// Menu dispatch. "1"/"stock" leads to the quote flow, "2"/"buy" to the
/// purchase flow; anything else restarts at /ivr. There is no retry limit.
async fn menu_handler(form: HashMap<String, String>) -> Result<impl Reply, Rejection> {
    let choice = CallerInput::from_form(&form);
    let token = choice.token().unwrap_or_default();

    let response = if token == "1" || token.eq_ignore_ascii_case("stock") {
        let mut response = VoiceResponse::new();
        response.gather(Gather::new("/stock-price", 4).say(QUOTE_SYMBOL_PROMPT));
        response
    } else if token == "2" || token.eq_ignore_ascii_case("buy") {
        let mut response = VoiceResponse::new();
        response.gather(Gather::new("/buy-stock", 4).say(BUY_SYMBOL_PROMPT));
        response
    } else {
        info!("Unrecognized menu choice {:?}, restarting menu.", token);
        let mut response = VoiceResponse::new();
        response.say("Invalid option. Please try again.").redirect("/ivr");
        response
    };

    Ok(xml(&response))
}

/// Quote flow terminal state. Reads nothing and writes nothing besides the
/// price lookup itself.
async fn stock_price_handler(
    form: HashMap<String, String>,
    quoter: Arc<dyn StockQuoter>,
) -> Result<impl Reply, Rejection> {
    let symbol = CallerInput::from_form(&form)
        .token()
        .unwrap_or_default()
        .to_string();

    let response = match quoter.quote(&symbol).await {
        Some(price) => {
            info!("Quoted {} at {:.2} USD.", symbol, price);
            say(&format!(
                "The current price of {} is {:.2} USD.",
                symbol, price
            ))
        }
        None => say(&not_found_message(&symbol)),
    };

    Ok(xml(&response))
}

/// Purchase flow terminal state. A "purchase" spends exactly one unit of the
/// quoted price; the balance check and the two writes are not atomic.
async fn buy_stock_handler(
    form: HashMap<String, String>,
    quoter: Arc<dyn StockQuoter>,
    store: Arc<dyn AccountStore>,
) -> Result<impl Reply, Rejection> {
    let symbol = CallerInput::from_form(&form)
        .token()
        .unwrap_or_default()
        .to_string();
    let phone_number = form.get("From").cloned().unwrap_or_default();

    let price = quoter.quote(&symbol).await;
    let balance = store
        .balance(&phone_number)
        .await
        .map_err(|e| store_rejection("balance read", e))?;

    let response = match (price, balance) {
        (Some(price), Some(balance)) => {
            let purchase_amount = price;
            if balance >= purchase_amount {
                store
                    .set_balance(&phone_number, balance - purchase_amount)
                    .await
                    .map_err(|e| store_rejection("balance update", e))?;
                store
                    .append_purchase(&phone_number, &symbol, purchase_amount)
                    .await
                    .map_err(|e| store_rejection("portfolio append", e))?;
                info!(
                    "Purchase of {} for {:.2} USD completed for {}.",
                    symbol, purchase_amount, phone_number
                );
                say(&format!(
                    "Stock purchase successful. {} bought at {:.2} USD.",
                    symbol, price
                ))
            } else {
                info!(
                    "Insufficient funds for {}: balance {:.2}, price {:.2}.",
                    phone_number, balance, purchase_amount
                );
                say(INSUFFICIENT_FUNDS)
            }
        }
        _ => say(&not_found_message(&symbol)),
    };

    Ok(xml(&response))
}

fn not_found_message(symbol: &str) -> String {
    format!(
        "Sorry, the stock symbol {} is not found or there was an issue fetching the data.",
        symbol
    )
}

fn store_rejection(operation: &'static str, e: StoreError) -> Rejection {
    error!("Account store {} failed: {}", operation, e);
    warp::reject::custom(StoreFailure {
        operation,
        message: e.to_string(),
    })
}
