//! User-facing message texts. Everything the bot says lives here so the
//! handler only decides *which* message to send.

use crate::domain::model::{LookupFailure, PriceOutcome, CURRENCY_MARKER};

pub const WELCOME: &str = "سلام! خوش آمدید. 🤖\n\n\
من میانگین قیمت آگهی‌های دیوار را برای شما محاسبه می‌کنم.\n\
لطفاً نام محصول یا خودرو را با جزئیات وارد کنید (مثلاً: آیفون ۱۳ پرو ۲۵۶ گیگ).";

pub const QUERY_TOO_SHORT: &str =
    "⚠️ عبارت جستجو خیلی کوتاه است. لطفاً جزئیات بیشتری بنویسید.";

pub const NO_LISTINGS_FOUND: &str =
    "❌ نتیجه‌ای در دیوار تهران پیدا نشد. لطفاً املای کلمات را چک کنید.";

pub const NO_PRICED_LISTINGS: &str =
    "💡 آگهی‌ها پیدا شدند، اما قیمت مشخصی ندارند (توافقی هستند).";

pub const SYSTEM_FAILURE: &str =
    "🛠 متأسفانه مشکلی در ارتباط با دیوار پیش آمد. لحظاتی دیگر تلاش کنید.";

/// Sent before the (slow) lookup starts.
pub fn searching(query: &str) -> String {
    format!("🔍 در حال جستجو و تحلیل ۲۰ آگهی اخیر برای:\n«{}»...", query)
}

pub fn failure(reason: LookupFailure) -> &'static str {
    match reason {
        LookupFailure::QueryTooShort => QUERY_TOO_SHORT,
        LookupFailure::NoListingsFound => NO_LISTINGS_FOUND,
        LookupFailure::NoPricedListings => NO_PRICED_LISTINGS,
        LookupFailure::SystemFailure => SYSTEM_FAILURE,
    }
}

pub fn average_price(query: &str, average: u64) -> String {
    format!(
        "📊 تحلیل قیمت دیوار تهران:\n\n🔹 کالا: {}\n💰 میانگین قیمت: {} {}",
        query,
        group_thousands(average),
        CURRENCY_MARKER
    )
}

pub fn render(query: &str, outcome: PriceOutcome) -> String {
    match outcome {
        PriceOutcome::Average(average) => average_price(query, average),
        PriceOutcome::Failed(reason) => failure(reason).to_string(),
    }
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
