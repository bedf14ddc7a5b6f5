use crate::domain::model::{ChatEvent, ChatId, PriceOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A rendered DOM element matched by a selector.
#[async_trait]
pub trait PageElement: Send + Sync {
    /// Visible text of the element; empty when it renders none.
    async fn text(&self) -> Result<String>;
}

/// One exclusively owned browser session, used for a single query.
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;

    async fn wait_fixed(&mut self, delay: Duration) -> Result<()> {
        tokio::time::sleep(delay).await;
        Ok(())
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<Box<dyn PageElement>>>;

    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn open_session(&self) -> Result<Box<dyn BrowserSession>>;
}

/// What the chat front end needs from the aggregator. Never fails: every
/// fault is already folded into [`PriceOutcome`].
#[async_trait]
pub trait PriceLookup: Send + Sync {
    async fn compute_average_price(&self, query: &str) -> PriceOutcome;
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Blocks (long-poll) until at least one event arrives or the poll
    /// window closes, in which case the batch is empty.
    async fn next_events(&self) -> Result<Vec<ChatEvent>>;

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;
}
