// SPDX-FileCopyrightText: 2026 Brigadir Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared state injected into every handler.

use brigadir_config::model::AdminConfig;
use brigadir_core::{BrigadirError, Role, User};
use brigadir_orders::{CaptureSessions, FormSessions, OrderEngine};
use brigadir_storage::queries::users;

use crate::relay::TelegramRelay;

/// Everything a handler needs: the engine, the session stores, the
/// relay, and the startup-fixed admin allowlist.
pub struct AppContext {
    pub engine: OrderEngine,
    pub sessions: FormSessions,
    pub captures: CaptureSessions,
    pub relay: TelegramRelay,
    pub admin: AdminConfig,
}

impl AppContext {
    pub fn new(engine: OrderEngine, relay: TelegramRelay, admin: AdminConfig) -> Self {
        Self {
            engine,
            sessions: FormSessions::new(),
            captures: CaptureSessions::new(),
            relay,
            admin,
        }
    }

    /// Lazily create (or fetch) the user row for an interacting account.
    pub async fn touch_user(&self, telegram_id: i64) -> Result<User, BrigadirError> {
        users::ensure_user(self.engine.database(), telegram_id, None).await
    }

    /// Admin access: env allowlist or stored admin role.
    pub async fn is_admin(&self, telegram_id: i64) -> Result<bool, BrigadirError> {
        if self.admin.is_admin(telegram_id) {
            return Ok(true);
        }
        let user = self.touch_user(telegram_id).await?;
        Ok(user.has_role(Role::Admin))
    }

    /// Manager access: manager role, or admin (admins can do everything
    /// managers can).
    pub async fn is_manager(&self, telegram_id: i64) -> Result<bool, BrigadirError> {
        if self.admin.is_admin(telegram_id) {
            return Ok(true);
        }
        let user = self.touch_user(telegram_id).await?;
        Ok(user.has_role(Role::Manager) || user.has_role(Role::Admin))
    }

    /// Master access: master role only.
    pub async fn is_master(&self, telegram_id: i64) -> Result<bool, BrigadirError> {
        let user = self.touch_user(telegram_id).await?;
        Ok(user.has_role(Role::Master))
    }
}
