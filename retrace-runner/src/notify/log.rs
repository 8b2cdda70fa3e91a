//! Notifier that only writes to the tracing log.

use super::{format_signal_message, round_price, Notifier, NotifyError};
use retrace_core::Signal;
use tracing::{debug, info};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn notify(&self, signal: &Signal) -> Result<(), NotifyError> {
        info!(
            symbol = %signal.symbol,
            direction = %signal.direction,
            entry = round_price(signal.entry_price),
            stop = round_price(signal.stop_loss),
            target = round_price(signal.take_profit),
            confidence = %signal.confidence,
            "signal"
        );
        debug!(text = %format_signal_message(signal), "rendered alert");
        Ok(())
    }
}
