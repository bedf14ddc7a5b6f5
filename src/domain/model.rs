use crate::utils::error::Result;
use serde::{Deserialize, Serialize};

/// Listings inspected per query stop once this many prices are collected.
pub const MAX_PRICE_SAMPLES: usize = 20;

/// Shorter trimmed queries are rejected before any browser work.
pub const MIN_QUERY_CHARS: usize = 3;

/// Word that marks a listing as carrying a concrete price ("Toman").
/// Listings without it are "negotiable" (توافقی) and are skipped.
pub const CURRENCY_MARKER: &str = "تومان";

/// Closed set of reasons a lookup produced no average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookupFailure {
    QueryTooShort,
    NoListingsFound,
    NoPricedListings,
    SystemFailure,
}

/// The single value handed from the aggregator to the chat front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceOutcome {
    Average(u64),
    Failed(LookupFailure),
}

impl PriceOutcome {
    pub fn average(&self) -> Option<u64> {
        match self {
            Self::Average(value) => Some(*value),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<LookupFailure> {
        match self {
            Self::Average(_) => None,
            Self::Failed(reason) => Some(*reason),
        }
    }

    /// Pretty JSON form, as printed by the command-line probe.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl From<LookupFailure> for PriceOutcome {
    fn from(reason: LookupFailure) -> Self {
        Self::Failed(reason)
    }
}

pub type ChatId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Start,
    /// Any other `/command`; ignored by the bot.
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEventKind {
    Command(ChatCommand),
    Text(String),
}

/// One inbound message, already stripped of transport specifics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub chat_id: ChatId,
    pub kind: ChatEventKind,
}

impl ChatEvent {
    /// Classifies raw message text the way Telegram clients send it:
    /// a leading `/word` (optionally `/word@botname`) is a command. A slash
    /// with no name right after it is plain text.
    pub fn from_text(chat_id: ChatId, text: &str) -> Self {
        let kind = match command_name(text) {
            Some(name) if name.eq_ignore_ascii_case("start") => {
                ChatEventKind::Command(ChatCommand::Start)
            }
            Some(name) => ChatEventKind::Command(ChatCommand::Unknown(name.to_string())),
            None => ChatEventKind::Text(text.to_string()),
        };
        Self { chat_id, kind }
    }
}

fn command_name(text: &str) -> Option<&str> {
    let rest = text.strip_prefix('/')?;
    let word = rest.split(char::is_whitespace).next().unwrap_or("");
    let name = word.split('@').next().unwrap_or("");
    (!name.is_empty()).then_some(name)
}
