// src/quotes.rs
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;

const QUOTE_ENDPOINT: &str = "https://www.alphavantage.co/query";

/// Current-price lookup for a ticker symbol. `None` covers every failure:
/// unknown symbol, transport error, unparsable response. Callers cannot
/// tell the causes apart; the distinction only reaches the log.
#[async_trait]
pub trait StockQuoter: Send + Sync {
    async fn quote(&self, symbol: &str) -> Option<f64>;
}

#[derive(Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: String,
}

#[derive(Deserialize)]
struct QuoteDocument {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
}

pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl AlphaVantageClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            endpoint: QUOTE_ENDPOINT.to_string(),
        }
    }
}

#[async_trait]
impl StockQuoter for AlphaVantageClient {
    async fn quote(&self, symbol: &str) -> Option<f64> {
        let response = match self
            .client
            .get(&self.endpoint)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Quote request for {} failed: {}", symbol, e);
                return None;
            }
        };

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to read quote response for {}: {}", symbol, e);
                return None;
            }
        };

        match parse_quote(&body) {
            Some(price) => {
                debug!("Quoted {} at {}", symbol, price);
                Some(price)
            }
            None => {
                error!("No usable quote for {} in provider response", symbol);
                None
            }
        }
    }
}

/// Extracts the latest price from a `GLOBAL_QUOTE` document. The provider
/// returns the price as a decimal string nested under "Global Quote"; an
/// unknown symbol yields a document without that block.
fn parse_quote(body: &str) -> Option<f64> {
    let document: QuoteDocument = serde_json::from_str(body).ok()?;
    document.global_quote?.price.parse().ok()
}
