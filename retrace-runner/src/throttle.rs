//! Per-symbol pacing and signal rate limits.
//!
//! Two independent gates sit outside the analyzer:
//! - analysis pacing: a symbol analyzed less than `interval` ago is skipped;
//! - signal admission: at most `max_daily` signals per symbol per UTC day, and
//!   none within `min_gap` of the previous one.
//!
//! All methods take an explicit `now` so cycles are reproducible in tests.

use crate::config::{
    BotConfigError, RiskConfig, ScheduleConfig, MAX_INTERVAL_MINUTES, MAX_SIGNAL_GAP_SECS,
};
use crate::notify::SignalHistory;
use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    DailyCapReached { sent_today: usize },
    TooSoon { wait_secs: i64 },
}

#[derive(Debug, Clone)]
pub struct SignalThrottle {
    interval: Duration,
    max_daily: usize,
    min_gap: Duration,
    excluded: Vec<Weekday>,
    last_analysis: HashMap<String, DateTime<Utc>>,
    sent: HashMap<String, Vec<DateTime<Utc>>>,
}

impl SignalThrottle {
    pub fn new(
        interval: Duration,
        max_daily: usize,
        min_gap: Duration,
        excluded: Vec<Weekday>,
    ) -> Self {
        Self {
            interval,
            max_daily,
            min_gap,
            excluded,
            last_analysis: HashMap::new(),
            sent: HashMap::new(),
        }
    }

    pub fn from_config(
        schedule: &ScheduleConfig,
        risk: &RiskConfig,
    ) -> Result<Self, BotConfigError> {
        let minutes = schedule.interval_minutes;
        let interval = bounded(minutes, MAX_INTERVAL_MINUTES, Duration::try_minutes)
            .ok_or(BotConfigError::IntervalTooLong(minutes))?;
        let secs = risk.min_seconds_between_signals;
        let min_gap = bounded(secs, MAX_SIGNAL_GAP_SECS, Duration::try_seconds)
            .ok_or(BotConfigError::SignalGapTooLong(secs))?;
        Ok(Self::new(
            interval,
            risk.max_daily_signals,
            min_gap,
            schedule.excluded_weekdays()?,
        ))
    }

    /// Swap in new limits; pacing and sent timestamps are kept.
    pub fn reconfigure(
        &mut self,
        schedule: &ScheduleConfig,
        risk: &RiskConfig,
    ) -> Result<(), BotConfigError> {
        let fresh = Self::from_config(schedule, risk)?;
        self.interval = fresh.interval;
        self.max_daily = fresh.max_daily;
        self.min_gap = fresh.min_gap;
        self.excluded = fresh.excluded;
        Ok(())
    }

    /// Replay sent timestamps from a persisted history.
    pub fn seed_from(&mut self, history: &SignalHistory) {
        for entry in history.iter() {
            self.record_sent(&entry.signal.symbol, entry.sent_at);
        }
    }

    pub fn is_excluded_day(&self, now: DateTime<Utc>) -> bool {
        self.excluded.contains(&now.weekday())
    }

    pub fn should_analyze(&self, symbol: &str, now: DateTime<Utc>) -> bool {
        match self.last_analysis.get(symbol) {
            Some(&last) => now - last >= self.interval,
            None => true,
        }
    }

    pub fn mark_analyzed(&mut self, symbol: &str, now: DateTime<Utc>) {
        self.last_analysis.insert(symbol.to_string(), now);
    }

    pub fn admit(&self, symbol: &str, now: DateTime<Utc>) -> Admission {
        let Some(sent) = self.sent.get(symbol) else {
            return Admission::Allowed;
        };
        let today = now.date_naive();
        let sent_today = sent.iter().filter(|t| t.date_naive() == today).count();
        if sent_today >= self.max_daily {
            return Admission::DailyCapReached { sent_today };
        }
        if let Some(&last) = sent.iter().max() {
            let elapsed = now - last;
            if elapsed < self.min_gap {
                return Admission::TooSoon {
                    wait_secs: (self.min_gap - elapsed).num_seconds(),
                };
            }
        }
        Admission::Allowed
    }

    pub fn record_sent(&mut self, symbol: &str, at: DateTime<Utc>) {
        let sent = self.sent.entry(symbol.to_string()).or_default();
        sent.push(at);
        // Only today's count and the latest timestamp are ever consulted.
        let cutoff = at - Duration::days(2);
        sent.retain(|t| *t >= cutoff);
    }

    pub fn last_analysis(&self, symbol: &str) -> Option<DateTime<Utc>> {
        self.last_analysis.get(symbol).copied()
    }
}

fn bounded(value: u64, max: u64, to_delta: fn(i64) -> Option<Duration>) -> Option<Duration> {
    if value > max {
        return None;
    }
    i64::try_from(value).ok().and_then(to_delta)
}
