// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification relay: group-topic announcements, direct messages, and
//! role broadcasts.
//!
//! Delivery happens strictly after the authoritative state change, so a
//! failure here never rolls anything back; callers report the partial
//! outcome instead.

use brigadir_config::model::TelegramConfig;
use brigadir_core::{BrigadirError, City};
use metrics::counter;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, MessageId, ParseMode, ThreadId};
use tracing::{debug, warn};

/// Sends outbound traffic through the bot, routed by the startup-fixed
/// telegram configuration.
#[derive(Clone)]
pub struct TelegramRelay {
    bot: Bot,
    config: TelegramConfig,
}

/// Aggregate result of a broadcast run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: u32,
    pub failed: u32,
}

impl TelegramRelay {
    pub fn new(bot: Bot, config: TelegramConfig) -> Self {
        Self { bot, config }
    }

    /// Announce an order into its city's topic thread.
    ///
    /// `Ok(None)` means no destination is configured for the city (or no
    /// group chat at all); the order stays published without an
    /// announcement. A transport failure is a [`BrigadirError::Delivery`].
    pub async fn announce(
        &self,
        city: City,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<Option<MessageId>, BrigadirError> {
        let Some(thread) = self.config.topic_thread(city) else {
            debug!(city = %city, "no topic configured, skipping announcement");
            return Ok(None);
        };

        let message = self
            .bot
            .send_message(ChatId(self.config.group_chat_id), text)
            .message_thread_id(ThreadId(MessageId(thread)))
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await
            .map_err(|e| BrigadirError::Delivery {
                message: format!("group announcement for {city} failed"),
                source: Some(Box::new(e)),
            })?;
        Ok(Some(message.id))
    }

    /// Direct-message a user, optionally with an inline keyboard.
    pub async fn direct_message(
        &self,
        telegram_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), BrigadirError> {
        let mut request = self
            .bot
            .send_message(ChatId(telegram_id), text)
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        request.await.map_err(|e| BrigadirError::Delivery {
            message: format!("direct message to {telegram_id} failed"),
            source: Some(Box::new(e)),
        })?;
        Ok(())
    }

    /// Send `text` to every recipient, tolerating per-recipient failure.
    ///
    /// One blocked or vanished recipient never aborts the batch; the
    /// report carries the aggregate counts.
    pub async fn broadcast(&self, recipients: &[i64], text: &str) -> BroadcastReport {
        let mut report = BroadcastReport { sent: 0, failed: 0 };
        for &telegram_id in recipients {
            match self.direct_message(telegram_id, text, None).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    warn!(telegram_id, error = %e, "broadcast delivery failed");
                    report.failed += 1;
                }
            }
        }
        counter!("brigadir_broadcast_sent_total").increment(report.sent as u64);
        counter!("brigadir_broadcast_failed_total").increment(report.failed as u64);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn announce_without_group_is_absent_not_error() {
        // group_chat_id stays 0: the routing check resolves before any
        // network call is attempted.
        let relay = TelegramRelay::new(Bot::new("123:test-token"), TelegramConfig::default());
        let result = relay
            .announce(
                City::Moscow,
                "text",
                crate::keyboards::group_response_keyboard(1),
            )
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn announce_skips_city_without_thread() {
        let mut config = TelegramConfig::default();
        config.group_chat_id = -100;
        config.city_topics.remove("omsk");
        let relay = TelegramRelay::new(Bot::new("123:test-token"), config);
        let result = relay
            .announce(
                City::Omsk,
                "text",
                crate::keyboards::group_response_keyboard(1),
            )
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn broadcast_with_no_recipients_is_empty_report() {
        let relay = TelegramRelay::new(Bot::new("123:test-token"), TelegramConfig::default());
        let report = relay.broadcast(&[], "hello").await;
        assert_eq!(report, BroadcastReport { sent: 0, failed: 0 });
    }
}
