use crate::app::replies;
use crate::domain::model::{ChatCommand, ChatEvent, ChatEventKind, ChatId};
use crate::domain::ports::{ChatTransport, PriceLookup};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

const DEFAULT_POLL_ERROR_PAUSE: Duration = Duration::from_secs(3);

/// Chat front end: turns inbound events into lookups and replies.
///
/// Holds no per-conversation state. Each text message becomes its own task,
/// so one slow lookup does not hold up other chats.
pub struct PriceBot<P, T> {
    lookup: Arc<P>,
    transport: Arc<T>,
    monitor: Arc<SystemMonitor>,
    poll_error_pause: Duration,
}

impl<P, T> Clone for PriceBot<P, T> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
            transport: Arc::clone(&self.transport),
            monitor: Arc::clone(&self.monitor),
            poll_error_pause: self.poll_error_pause,
        }
    }
}

impl<P, T> PriceBot<P, T>
where
    P: PriceLookup + 'static,
    T: ChatTransport + 'static,
{
    pub fn new(lookup: P, transport: T) -> Self {
        Self {
            lookup: Arc::new(lookup),
            transport: Arc::new(transport),
            monitor: Arc::new(SystemMonitor::default()),
            poll_error_pause: DEFAULT_POLL_ERROR_PAUSE,
        }
    }

    pub fn with_monitor(mut self, monitor: SystemMonitor) -> Self {
        self.monitor = Arc::new(monitor);
        self
    }

    pub fn with_poll_error_pause(mut self, pause: Duration) -> Self {
        self.poll_error_pause = pause;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn handle_event(&self, event: ChatEvent) -> Result<()> {
        match event.kind {
            ChatEventKind::Command(ChatCommand::Start) => {
                self.reply(event.chat_id, replies::WELCOME).await
            }
            ChatEventKind::Command(ChatCommand::Unknown(name)) => {
                tracing::debug!("Ignoring unsupported command /{}", name);
                Ok(())
            }
            ChatEventKind::Text(query) => self.answer_query(event.chat_id, &query).await,
        }
    }

    async fn answer_query(&self, chat_id: ChatId, query: &str) -> Result<()> {
        self.reply(chat_id, &replies::searching(query)).await?;

        let started = Instant::now();
        let outcome = self.lookup.compute_average_price(query).await;
        self.monitor.log_stats("Lookup", started.elapsed());

        self.reply(chat_id, &replies::render(query, outcome)).await
    }

    async fn reply(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.transport.send_text(chat_id, text).await
    }

    async fn dispatch(self, event: ChatEvent) {
        let chat_id = event.chat_id;
        if let Err(e) = self.handle_event(event).await {
            tracing::error!("❌ Failed to answer chat {}: {}", chat_id, e);
        }
    }

    /// Long-polls the transport until `shutdown` resolves, then waits for
    /// in-flight lookups to finish. Transport errors are logged and polling
    /// resumes after a short pause.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut in_flight = JoinSet::new();

        tracing::info!("🤖 Bot is running, waiting for messages");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                polled = self.transport.next_events() => match polled {
                    Ok(events) => {
                        for event in events {
                            in_flight.spawn(self.clone().dispatch(event));
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Polling for messages failed: {}", e);
                        tokio::select! {
                            _ = &mut shutdown => break,
                            _ = tokio::time::sleep(self.poll_error_pause) => {}
                        }
                    }
                },
            }

            while let Some(joined) = in_flight.try_join_next() {
                if let Err(e) = joined {
                    tracing::error!("Message handler task panicked: {}", e);
                }
            }
        }

        if !in_flight.is_empty() {
            tracing::info!("Waiting for {} in-flight lookups", in_flight.len());
        }
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Message handler task panicked: {}", e);
            }
        }
        self.monitor.log_final_stats();
        tracing::info!("👋 Bot stopped");
    }
}
