// Adapters layer: concrete implementations of the domain ports for external
// systems (headless Chrome, Telegram).

pub mod chromium;
pub mod telegram;

pub use chromium::{ChromiumConfig, ChromiumLauncher};
pub use telegram::TelegramTransport;
