//! Dispatch layer — routes inbound events through the conversation engine
//! and turns engine outcomes into transport + persistence effects.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{error, info, warn};

use crate::channels::{Event, EventKind, EventStream, Transport};
use crate::config::Config;
use crate::dialog::{Reply, SessionStore, engine, keyboard};
use crate::export;
use crate::models::{NewOrder, User};
use crate::store::{Database, OrderStore, SaveOutcome, UserStore};

const WELCOME: &str = "Hi! To book a window wash, press the button below 👇";
const CONFIRMED: &str = "Your order is confirmed! Expect our team soon.";
const NEEDS_CLARIFICATION: &str =
    "There is already a confirmed order for this apartment. \
     We have recorded yours and will contact you to sort it out.";
const SAVE_APOLOGY: &str =
    "Sorry, we could not save your order. Please try confirming again later.";
const UNKNOWN_COMMAND: &str = "I don't understand that command.";
const NOT_ADMIN: &str = "You do not have permission to run this command.";
const EXPORT_APOLOGY: &str = "Sorry, the report could not be prepared.";

/// The bot: one session store, one database, one transport.
pub struct Bot<T> {
    transport: T,
    sessions: SessionStore,
    db: Arc<Database>,
    config: Config,
}

impl<T: Transport> Bot<T> {
    pub fn new(transport: T, db: Arc<Database>, config: Config) -> Self {
        Self {
            transport,
            sessions: SessionStore::new(),
            db,
            config,
        }
    }

    /// Consume the inbound event stream until it ends.
    pub async fn run(&self, mut events: EventStream) {
        info!("Bot processing updates...");
        while let Some(event) = events.next().await {
            self.handle_event(event).await;
        }
        info!("Event stream closed; bot stopping");
    }

    /// Handle one inbound event. Send failures are logged, never fatal.
    pub async fn handle_event(&self, event: Event) {
        // Upsert the user on every interaction; failures are non-fatal.
        if let Err(e) = UserStore::upsert(&self.db, &event.user) {
            warn!(chat_id = event.chat_id, "Failed to save user: {e}");
        }

        let result = match &event.kind {
            EventKind::Command(cmd) => self.handle_command(event.chat_id, cmd).await,
            EventKind::Text(text) => {
                self.handle_engine(event.chat_id, &event.user, engine::Input::Text(text.as_str()))
                    .await
            }
            EventKind::Callback { id, data } => {
                if let Err(e) = self.transport.answer_callback(id).await {
                    warn!(chat_id = event.chat_id, "Failed to answer callback: {e}");
                }
                if data == keyboard::TOKEN_NEW_ORDER {
                    self.handle_new_order(event.chat_id).await
                } else {
                    self.handle_engine(
                        event.chat_id,
                        &event.user,
                        engine::Input::Button(data.as_str()),
                    )
                    .await
                }
            }
        };

        if let Err(e) = result {
            warn!(chat_id = event.chat_id, "Failed to send response: {e}");
        }
    }

    async fn handle_command(
        &self,
        chat_id: i64,
        cmd: &str,
    ) -> Result<(), crate::error::ChannelError> {
        if cmd.starts_with("/start") {
            let reply = Reply::with_keyboard(WELCOME, keyboard::main_menu());
            self.transport.send_reply(chat_id, &reply).await
        } else if cmd.starts_with("/export") {
            self.handle_export(chat_id, cmd).await
        } else {
            self.transport
                .send_reply(chat_id, &Reply::text(UNKNOWN_COMMAND))
                .await
        }
    }

    async fn handle_new_order(&self, chat_id: i64) -> Result<(), crate::error::ChannelError> {
        let reply = self.sessions.with(chat_id, engine::start);
        self.transport.send_reply(chat_id, &reply).await
    }

    async fn handle_engine(
        &self,
        chat_id: i64,
        user: &User,
        input: engine::Input<'_>,
    ) -> Result<(), crate::error::ChannelError> {
        let outcome = self.sessions.with(chat_id, |session| {
            engine::handle(session, input)
        });

        match outcome {
            engine::Outcome::Prompt(reply) | engine::Outcome::Invalid(reply) => {
                self.transport.send_reply(chat_id, &reply).await
            }
            engine::Outcome::Canceled(reply) => {
                self.sessions.clear(chat_id);
                self.transport.send_reply(chat_id, &reply).await
            }
            engine::Outcome::Finalized(order) => self.finalize(chat_id, user, &order).await,
        }
    }

    /// Persist a confirmed order and report the outcome to the user.
    ///
    /// On a save failure the session is deliberately left intact so the
    /// user can press Confirm again.
    async fn finalize(
        &self,
        chat_id: i64,
        user: &User,
        order: &NewOrder,
    ) -> Result<(), crate::error::ChannelError> {
        match OrderStore::save(&self.db, order) {
            Ok(SaveOutcome::Confirmed { superseded }) => {
                if superseded {
                    info!(chat_id, "Order superseded the user's prior order");
                }
                self.sessions.clear(chat_id);
                let reply = Reply::with_keyboard(CONFIRMED, keyboard::main_menu());
                self.transport.send_reply(chat_id, &reply).await
            }
            Ok(SaveOutcome::NeedsClarification) => {
                self.sessions.clear(chat_id);
                self.notify_admin_about_duplicate(user, order).await;
                let reply = Reply::with_keyboard(NEEDS_CLARIFICATION, keyboard::main_menu());
                self.transport.send_reply(chat_id, &reply).await
            }
            Err(e) => {
                error!(chat_id, "Failed to save order: {e}");
                self.transport
                    .send_reply(chat_id, &Reply::text(SAVE_APOLOGY))
                    .await
            }
        }
    }

    async fn notify_admin_about_duplicate(&self, user: &User, order: &NewOrder) {
        let Some(admin_id) = self.config.admin_chat_id else {
            return;
        };
        let text = format!(
            "⚠️ Duplicate order detected!\n\n\
             Entrance: {}\nFloor: {}\nApartment: {}\n\
             User: @{} ({})\n\n\
             The first order stays confirmed; this one needs clarification.",
            order.entrance, order.floor, order.apartment, user.username, user.telegram_id,
        );
        if let Err(e) = self.transport.send_reply(admin_id, &Reply::text(text)).await {
            warn!("Failed to notify admin about duplicate: {e}");
        }
    }

    async fn handle_export(
        &self,
        chat_id: i64,
        cmd: &str,
    ) -> Result<(), crate::error::ChannelError> {
        if !self.config.is_admin(chat_id) {
            return self
                .transport
                .send_reply(chat_id, &Reply::text(NOT_ADMIN))
                .await;
        }

        // `/export` → current orders only; `/export all` → full history.
        let only_current = !cmd.contains("all");

        let orders = match OrderStore::for_export(&self.db, only_current) {
            Ok(orders) => orders,
            Err(e) => {
                error!("Failed to query orders for export: {e}");
                return self
                    .transport
                    .send_reply(chat_id, &Reply::text(EXPORT_APOLOGY))
                    .await;
            }
        };

        let csv = match export::to_csv(&orders) {
            Ok(csv) => csv,
            Err(e) => {
                error!("Failed to build CSV export: {e}");
                return self
                    .transport
                    .send_reply(chat_id, &Reply::text(EXPORT_APOLOGY))
                    .await;
            }
        };

        let file_name = export::file_name(only_current, chrono::Utc::now().date_naive());
        let caption = if only_current {
            "Orders report (current only)"
        } else {
            "Orders report (all orders)"
        };
        self.transport
            .send_document(chat_id, csv, &file_name, Some(caption))
            .await
    }

    #[cfg(test)]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
