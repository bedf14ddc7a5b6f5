use async_trait::async_trait;
use divar_price_bot::app::replies;
use divar_price_bot::domain::ports::{BrowserLauncher, BrowserSession, PageElement};
use divar_price_bot::{
    AggregatorConfig, LookupFailure, PriceAggregator, PriceBot, PriceBotError, PriceOutcome,
    Result, TelegramTransport,
};
use httpmock::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Serves a fixed results page; optionally fails on navigation.
#[derive(Clone)]
struct ScriptedBrowser {
    listings: Vec<String>,
    fail_navigation: bool,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl ScriptedBrowser {
    fn new(listings: &[&str]) -> Self {
        Self {
            listings: listings.iter().map(|s| s.to_string()).collect(),
            fail_navigation: false,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing() -> Self {
        Self {
            fail_navigation: true,
            ..Self::new(&[])
        }
    }
}

struct ScriptedSession(ScriptedBrowser);

struct TextElement(String);

#[async_trait]
impl PageElement for TextElement {
    async fn text(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn navigate(&mut self, _url: &str) -> Result<()> {
        if self.0.fail_navigation {
            return Err(PriceBotError::browser("net::ERR_NAME_NOT_RESOLVED"));
        }
        Ok(())
    }

    async fn find_all(&mut self, _selector: &str) -> Result<Vec<Box<dyn PageElement>>> {
        Ok(self
            .0
            .listings
            .iter()
            .map(|text| Box::new(TextElement(text.clone())) as Box<dyn PageElement>)
            .collect())
    }

    async fn close(&mut self) -> Result<()> {
        self.0.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl BrowserLauncher for ScriptedBrowser {
    async fn open_session(&self) -> Result<Box<dyn BrowserSession>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession(self.clone())))
    }
}

fn aggregator(browser: ScriptedBrowser) -> PriceAggregator<ScriptedBrowser> {
    PriceAggregator::new(
        browser,
        AggregatorConfig {
            settle_delay: Duration::ZERO,
            ..AggregatorConfig::default()
        },
    )
}

#[tokio::test]
async fn test_scenario_query_too_short() {
    let browser = ScriptedBrowser::new(&["۱۰۰ تومان"]);
    let outcome = aggregator(browser.clone()).compute_average_price("ab").await;

    assert_eq!(outcome, PriceOutcome::Failed(LookupFailure::QueryTooShort));
    assert_eq!(browser.opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_scenario_no_listings() {
    let browser = ScriptedBrowser::new(&[]);
    let outcome = aggregator(browser.clone())
        .compute_average_price("گوشی سامسونگ")
        .await;

    assert_eq!(outcome, PriceOutcome::Failed(LookupFailure::NoListingsFound));
    assert_eq!(browser.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_scenario_all_negotiable() {
    let browser = ScriptedBrowser::new(&["توافقی", "توافقی", "توافقی"]);
    let outcome = aggregator(browser.clone())
        .compute_average_price("گوشی سامسونگ")
        .await;

    assert_eq!(outcome, PriceOutcome::Failed(LookupFailure::NoPricedListings));
    assert_eq!(browser.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_scenario_average_of_three() {
    let browser = ScriptedBrowser::new(&[
        "۱,۰۰۰,۰۰۰ تومان",
        "۲,۰۰۰,۰۰۰ تومان",
        "۳,۰۰۰,۰۰۰ تومان",
    ]);
    let outcome = aggregator(browser.clone())
        .compute_average_price("گوشی سامسونگ")
        .await;

    assert_eq!(outcome, PriceOutcome::Average(2_000_000));
    assert_eq!(browser.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_scenario_navigation_fault() {
    let browser = ScriptedBrowser::failing();
    let outcome = aggregator(browser.clone())
        .compute_average_price("گوشی سامسونگ")
        .await;

    assert_eq!(outcome, PriceOutcome::Failed(LookupFailure::SystemFailure));
    assert_eq!(browser.opened.load(Ordering::SeqCst), 1);
    assert_eq!(browser.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_bot_answers_over_telegram_end_to_end() {
    const TOKEN: &str = "42:flow-test";
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST)
            .path(format!("/bot{}/getUpdates", TOKEN))
            .json_body_partial(r#"{"offset": 0}"#);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "ok": true,
                "result": [
                    {"update_id": 100, "message": {"message_id": 1, "chat": {"id": 7, "type": "private"}, "text": "پراید ۸۸"}}
                ]
            }));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path(format!("/bot{}/getUpdates", TOKEN))
            .json_body_partial(r#"{"offset": 101}"#);
        then.status(200)
            .header("Content-Type", "application/json")
            .delay(Duration::from_millis(20))
            .json_body(serde_json::json!({"ok": true, "result": []}));
    });

    let ack = server.mock(|when, then| {
        when.method(POST)
            .path(format!("/bot{}/sendMessage", TOKEN))
            .json_body(serde_json::json!({"chat_id": 7, "text": replies::searching("پراید ۸۸")}));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"ok": true, "result": {}}));
    });
    let answer = server.mock(|when, then| {
        when.method(POST)
            .path(format!("/bot{}/sendMessage", TOKEN))
            .json_body(serde_json::json!({
                "chat_id": 7,
                "text": replies::average_price("پراید ۸۸", 150_000_000)
            }));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"ok": true, "result": {}}));
    });

    let browser = ScriptedBrowser::new(&["۱۰۰,۰۰۰,۰۰۰ تومان", "توافقی", "۲۰۰,۰۰۰,۰۰۰ تومان"]);
    let transport = TelegramTransport::new(&server.base_url(), TOKEN, Duration::from_secs(0)).unwrap();
    let bot = PriceBot::new(aggregator(browser.clone()), transport)
        .with_poll_error_pause(Duration::from_millis(10));

    bot.run_until(tokio::time::sleep(Duration::from_millis(500)))
        .await;

    ack.assert();
    answer.assert();
    assert_eq!(browser.opened.load(Ordering::SeqCst), 1);
    assert_eq!(browser.closed.load(Ordering::SeqCst), 1);
}
