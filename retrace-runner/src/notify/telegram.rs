//! Telegram Bot API notifier.

use super::{format_signal_message, Notifier, NotifyError};
use retrace_core::Signal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub const TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramNotifier {
    client: reqwest::blocking::Client,
    token: String,
    chat_id: String,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    pub fn new(token: String, chat_id: String) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| NotifyError::Http(e.to_string()))?;
        Ok(Self {
            client,
            token,
            chat_id,
        })
    }

    /// Read `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID` from the environment.
    pub fn from_env() -> Result<Self, NotifyError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, NotifyError> {
        let get = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(NotifyError::MissingCredential(key))
        };
        let token = get(TOKEN_VAR)?;
        let chat_id = get(CHAT_ID_VAR)?;
        Self::new(token, chat_id)
    }

    fn endpoint(&self) -> String {
        format!("{API_BASE}/bot{}/sendMessage", self.token)
    }

    pub fn send_text(&self, text: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
        };
        let resp = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            // The URL carries the token; keep it out of the error text.
            .map_err(|e| NotifyError::Http(e.without_url().to_string()))?;
        let status = resp.status();
        let reply: ApiReply = resp.json().map_err(|e| NotifyError::Rejected {
            service: "telegram".into(),
            reason: format!("HTTP {status}, unreadable reply: {}", e.without_url()),
        })?;
        if !reply.ok {
            return Err(NotifyError::Rejected {
                service: "telegram".into(),
                reason: reply
                    .description
                    .unwrap_or_else(|| format!("HTTP {status}")),
            });
        }
        Ok(())
    }
}

impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    fn notify(&self, signal: &Signal) -> Result<(), NotifyError> {
        self.send_text(&format_signal_message(signal))?;
        info!(symbol = %signal.symbol, "signal sent to telegram");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_token_is_reported() {
        let err = TelegramNotifier::from_lookup(lookup(&[(CHAT_ID_VAR, "42")])).unwrap_err();
        assert!(matches!(err, NotifyError::MissingCredential(TOKEN_VAR)));
    }

    #[test]
    fn blank_chat_id_is_missing() {
        let err = TelegramNotifier::from_lookup(lookup(&[(TOKEN_VAR, "abc"), (CHAT_ID_VAR, " ")]))
            .unwrap_err();
        assert!(matches!(err, NotifyError::MissingCredential(CHAT_ID_VAR)));
    }

    #[test]
    fn endpoint_and_debug_output() {
        let n = TelegramNotifier::from_lookup(lookup(&[(TOKEN_VAR, "123:abc"), (CHAT_ID_VAR, "42")]))
            .unwrap();
        assert_eq!(n.endpoint(), "https://api.telegram.org/bot123:abc/sendMessage");
        assert!(!format!("{n:?}").contains("123:abc"));
    }

    #[test]
    fn request_body_uses_html_mode() {
        let body = SendMessage {
            chat_id: "42",
            text: "<b>hi</b>",
            parse_mode: "HTML",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["parse_mode"], "HTML");
        assert_eq!(json["chat_id"], "42");
    }
}
