// src/models.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One purchase on an account. `amount` is the money spent on the buy, not a
/// share count; the call flow always spends exactly one unit of the quoted
/// price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub symbol: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub phone_number: String,
    pub balance: f64,
    pub portfolio: Vec<PortfolioEntry>,
}

/// Caller input as delivered by the telephony webhook. Twilio sends either a
/// `SpeechResult` transcript or the collected `Digits`; on a Gather timeout
/// neither field is present.
#[derive(Debug, Clone, PartialEq)]
pub enum CallerInput {
    Speech(String),
    Digits(String),
    Absent,
}

impl CallerInput {
    /// Resolves the webhook form body once at the boundary. `SpeechResult`
    /// wins over `Digits` when both are present.
    pub fn from_form(form: &HashMap<String, String>) -> Self {
        if let Some(speech) = form.get("SpeechResult") {
            CallerInput::Speech(speech.clone())
        } else if let Some(digits) = form.get("Digits") {
            CallerInput::Digits(digits.clone())
        } else {
            CallerInput::Absent
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            CallerInput::Speech(s) | CallerInput::Digits(s) => Some(s),
            CallerInput::Absent => None,
        }
    }
}
