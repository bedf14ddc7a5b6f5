use crate::core::extraction::{extract_price, floor_mean};
use crate::domain::model::{LookupFailure, PriceOutcome, MAX_PRICE_SAMPLES, MIN_QUERY_CHARS};
use crate::domain::ports::{BrowserLauncher, BrowserSession, PriceLookup};
use crate::utils::error::{PriceBotError, Result};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

pub const DEFAULT_MARKETPLACE_URL: &str = "https://divar.ir";
pub const SEARCH_REGION: &str = "tehran";
pub const LISTING_SELECTOR: &str = ".kt-post-card__description";
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub marketplace_url: String,
    /// Fixed pause after navigation so client-side rendered cards appear.
    pub settle_delay: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            marketplace_url: DEFAULT_MARKETPLACE_URL.to_string(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Turns a free-text query into an average asking price.
///
/// Stateless between calls: every lookup opens its own browser session
/// through the launcher and closes it before returning.
pub struct PriceAggregator<L: BrowserLauncher> {
    launcher: L,
    config: AggregatorConfig,
}

impl<L: BrowserLauncher> PriceAggregator<L> {
    pub fn new(launcher: L, config: AggregatorConfig) -> Self {
        Self { launcher, config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// `<marketplace>/s/tehran?q=<query>`, with the raw query percent-encoded.
    pub fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.marketplace_url).map_err(|e| {
            PriceBotError::ConfigValidationError {
                field: "marketplace.base_url".to_string(),
                message: e.to_string(),
            }
        })?;

        url.path_segments_mut()
            .map_err(|_| PriceBotError::ConfigValidationError {
                field: "marketplace.base_url".to_string(),
                message: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(["s", SEARCH_REGION]);
        url.query_pairs_mut().append_pair("q", query);

        Ok(url)
    }

    pub async fn compute_average_price(&self, query: &str) -> PriceOutcome {
        if query.trim().chars().count() < MIN_QUERY_CHARS {
            tracing::debug!("Rejecting short query {:?}", query);
            return LookupFailure::QueryTooShort.into();
        }

        let url = match self.search_url(query) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("❌ Cannot build search URL: {}", e);
                return LookupFailure::SystemFailure.into();
            }
        };

        tracing::info!("🔍 Looking up prices for {:?}", query);

        let mut session = match self.launcher.open_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("❌ Scraping error while launching browser: {}", e);
                return LookupFailure::SystemFailure.into();
            }
        };

        let scanned = self.scan_listings(session.as_mut(), url.as_str()).await;

        if let Err(e) = session.close().await {
            tracing::warn!("Browser session did not close cleanly: {}", e);
        }

        match scanned {
            Ok(outcome) => {
                tracing::info!("📊 Lookup for {:?} finished: {:?}", query, outcome);
                outcome
            }
            Err(e) => {
                tracing::error!("❌ Scraping error for {:?}: {}", query, e);
                LookupFailure::SystemFailure.into()
            }
        }
    }

    async fn scan_listings(
        &self,
        session: &mut dyn BrowserSession,
        url: &str,
    ) -> Result<PriceOutcome> {
        tracing::debug!("Navigating to {}", url);
        session.navigate(url).await?;
        session.wait_fixed(self.config.settle_delay).await?;

        let listings = session.find_all(LISTING_SELECTOR).await?;
        if listings.is_empty() {
            return Ok(LookupFailure::NoListingsFound.into());
        }
        tracing::debug!("Found {} listing cards", listings.len());

        let mut prices = Vec::with_capacity(MAX_PRICE_SAMPLES);
        for listing in &listings {
            if prices.len() >= MAX_PRICE_SAMPLES {
                break;
            }
            let text = listing.text().await?;
            match extract_price(&text) {
                Ok(Some(price)) => prices.push(price),
                Ok(None) => {}
                // One garbled card must not sink the whole query.
                Err(e) => tracing::warn!("Skipping listing: {}", e),
            }
        }
        tracing::debug!("Collected {} price samples", prices.len());

        Ok(match floor_mean(&prices) {
            Some(average) => PriceOutcome::Average(average),
            None => LookupFailure::NoPricedListings.into(),
        })
    }
}

#[async_trait]
impl<L: BrowserLauncher> PriceLookup for PriceAggregator<L> {
    async fn compute_average_price(&self, query: &str) -> PriceOutcome {
        PriceAggregator::compute_average_price(self, query).await
    }
}
