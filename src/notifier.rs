// Offline notifications via the Telegram Bot API. Delivery failures are logged, never returned.

use serde::Serialize;

use crate::config::TelegramConfig;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
}

/// Not `Debug`: `target` embeds the bot token.
#[derive(Clone)]
pub struct TelegramNotifier {
    target: Option<(String, i64)>,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// `None` disables delivery; messages are only logged.
    pub fn new(config: Option<&TelegramConfig>) -> Self {
        Self::with_api_base(config, TELEGRAM_API_BASE)
    }

    /// Same as [`TelegramNotifier::new`] against a different API host (tests, proxies).
    pub fn with_api_base(config: Option<&TelegramConfig>, api_base: &str) -> Self {
        let target = config.map(|c| {
            (
                format!(
                    "{}/bot{}/sendMessage",
                    api_base.trim_end_matches('/'),
                    c.bot_token
                ),
                c.chat_id,
            )
        });
        Self {
            target,
            client: reqwest::Client::builder()
                .user_agent(crate::version::user_agent())
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    pub async fn agent_offline(&self, name: &str) {
        self.send(&format!("🔴 PC *{}* went offline!", name)).await;
    }

    pub async fn agent_timed_out(&self, name: &str) {
        self.send(&format!("🔴 PC *{}* disconnected on timeout!", name))
            .await;
    }

    pub async fn send(&self, text: &str) {
        let Some((url, chat_id)) = &self.target else {
            tracing::debug!(text, "Telegram not configured; skipping notification");
            return;
        };
        if let Err(e) = self.post(url, *chat_id, text).await {
            tracing::error!(error = %e, "Failed to send Telegram notification");
        } else {
            tracing::info!("Telegram notification sent");
        }
    }

    async fn post(&self, url: &str, chat_id: i64, text: &str) -> Result<(), reqwest::Error> {
        self.client
            .post(url)
            .json(&SendMessage {
                chat_id,
                text,
                parse_mode: "Markdown",
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
