pub mod bot;
pub mod replies;

pub use bot::PriceBot;
