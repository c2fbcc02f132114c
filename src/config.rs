// src/config.rs
use std::env;

/// Process configuration, environment-supplied. The Twilio values identify
/// this line to the telephony provider; the Alpha Vantage key authenticates
/// quote lookups.
pub struct Config {
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_phone_number: String,
    pub alpha_vantage_api_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            twilio_account_sid: require("TWILIO_ACCOUNT_SID")?,
            twilio_auth_token: require("TWILIO_AUTH_TOKEN")?,
            twilio_phone_number: require("TWILIO_PHONE_NUMBER")?,
            alpha_vantage_api_key: require("ALPHA_VANTAGE_API_KEY")?,
        })
    }
}

fn require(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    env::var(name).map_err(|_| format!("missing environment variable {}", name).into())
}
