pub mod aggregator;
pub mod extraction;

pub use crate::domain::model::{LookupFailure, PriceOutcome};
pub use crate::domain::ports::{BrowserLauncher, BrowserSession, PageElement, PriceLookup};
pub use crate::utils::error::Result;
