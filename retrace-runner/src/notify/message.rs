//! Alert and status text.
//!
//! Messages use Telegram's HTML parse mode. Prices are rounded to five decimal
//! places at this point only; signals keep full precision.

use chrono::{DateTime, Utc};
use retrace_core::{Direction, Signal};

const PRICE_DECIMALS: i32 = 5;

pub fn round_price(price: f64) -> f64 {
    let scale = 10f64.powi(PRICE_DECIMALS);
    (price * scale).round() / scale
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn format_signal_message(signal: &Signal) -> String {
    let marker = match signal.direction {
        Direction::Buy => "🟢",
        Direction::Sell => "🔴",
    };
    format!(
        "{marker} <b>RETRACE SIGNAL</b> {marker}\n\n\
         <b>Symbol:</b> {symbol}\n\
         <b>Direction:</b> {direction}\n\
         <b>Entry Price:</b> {entry}\n\
         <b>Stop Loss:</b> {stop}\n\
         <b>Take Profit:</b> {target}\n\
         <b>Confidence:</b> {confidence}\n\
         <b>Reason:</b> {reason}\n\n\
         ⚠️ <i>Trade at your own risk</i>",
        symbol = escape_html(&signal.symbol),
        direction = signal.direction,
        entry = round_price(signal.entry_price),
        stop = round_price(signal.stop_loss),
        target = round_price(signal.take_profit),
        confidence = signal.confidence,
        reason = escape_html(&signal.reason),
    )
}

/// What `status` reports about a running bot.
#[derive(Debug, Clone)]
pub struct StatusView<'a> {
    pub symbols: &'a [String],
    pub interval_minutes: u64,
    pub last_signal: Option<DateTime<Utc>>,
}

pub fn format_status(view: &StatusView<'_>) -> String {
    let last = view
        .last_signal
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "No signals yet".to_string());
    format!(
        "Retrace status\n\n\
         Monitoring: {}\n\
         Analysis interval: every {} minutes\n\
         Last signal: {last}",
        view.symbols.join(", "),
        view.interval_minutes,
    )
}
