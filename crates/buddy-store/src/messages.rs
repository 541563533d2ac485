//! Message log: append-only, full-replace persisted under `bb_messages`.
//!
//! Sending never fails from the caller's point of view. When the log cannot
//! be written the message is parked in the handle's outbox, reported as
//! [`SyncStatus::Unsynced`], and still shows up in reads from this handle.
//! The next send or [`Database::flush_outbox`] retries it.

use std::collections::HashSet;
use std::sync::MutexGuard;

use serde::Serialize;
use tracing::{debug, warn};

use crate::database::{read_collection, write_collection, Database};
use crate::error::Result;
use crate::keys;
use crate::models::{timestamp, ItemId, Message, MessageId, UserId};

/// Durability of a sent message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncStatus {
    /// Written to the log.
    Persisted,
    /// Held in memory only; may be lost on reload.
    Unsynced,
}

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub message: Message,
    pub sync: SyncStatus,
}

impl Database {
    /// Append a message from `sender` to `receiver`.
    ///
    /// Always returns the constructed message. Pending outbox messages are
    /// written ahead of it, keeping send order.
    pub fn send_message(
        &self,
        sender: &UserId,
        receiver: &UserId,
        text: &str,
        item_id: Option<ItemId>,
    ) -> SentMessage {
        let message = Message {
            id: MessageId::generate(),
            sender_id: sender.clone(),
            receiver_id: receiver.clone(),
            text: text.to_string(),
            timestamp: timestamp::now(),
            item_id,
        };

        let written = self.with_substrate(|sub| {
            let mut outbox = self.lock_outbox();
            let mut log = read_collection::<Message>(sub, keys::MESSAGES).into_vec();
            let already: HashSet<MessageId> = log.iter().map(|m| m.id.clone()).collect();
            log.extend(outbox.iter().filter(|m| !already.contains(&m.id)).cloned());
            log.push(message.clone());

            match write_collection(sub, keys::MESSAGES, &log) {
                Ok(()) => {
                    outbox.clear();
                    true
                }
                Err(e) => {
                    warn!(message_id = %message.id, error = %e, "message not persisted, keeping it in the outbox");
                    outbox.push(message.clone());
                    false
                }
            }
        });

        let sync = if written {
            debug!(message_id = %message.id, "message sent");
            SyncStatus::Persisted
        } else {
            SyncStatus::Unsynced
        };
        SentMessage { message, sync }
    }

    /// Every message between `a` and `b`, in either direction, oldest first.
    /// Messages with equal timestamps keep the order they were sent in.
    pub fn messages_between(&self, a: &UserId, b: &UserId) -> Vec<Message> {
        let mut thread: Vec<Message> = self
            .visible_messages()
            .into_iter()
            .filter(|m| m.is_between(a, b))
            .collect();
        // stable: ties keep log order
        thread.sort_by_key(|m| m.timestamp);
        thread
    }

    /// Distinct counterparts of `user`, in order of first appearance.
    pub fn conversations_for(&self, user: &UserId) -> Vec<UserId> {
        let mut seen = HashSet::new();
        let mut partners = Vec::new();
        for message in self.visible_messages() {
            if let Some(other) = message.counterpart(user) {
                if seen.insert(other.clone()) {
                    partners.push(other.clone());
                }
            }
        }
        partners
    }

    /// Messages still waiting to be written.
    pub fn pending_messages(&self) -> Vec<Message> {
        self.lock_outbox().clone()
    }

    /// Retry writing the outbox. Returns how many messages were written.
    pub fn flush_outbox(&self) -> Result<usize> {
        self.with_substrate(|sub| {
            let mut outbox = self.lock_outbox();
            if outbox.is_empty() {
                return Ok(0);
            }

            let mut log = read_collection::<Message>(sub, keys::MESSAGES).into_vec();
            let already: HashSet<MessageId> = log.iter().map(|m| m.id.clone()).collect();
            let pending: Vec<Message> = outbox
                .iter()
                .filter(|m| !already.contains(&m.id))
                .cloned()
                .collect();
            let count = pending.len();
            log.extend(pending);

            write_collection(sub, keys::MESSAGES, &log)?;
            outbox.clear();
            debug!(count, "outbox flushed");
            Ok(count)
        })
    }

    /// Durable log followed by this handle's unsynced messages.
    fn visible_messages(&self) -> Vec<Message> {
        self.with_substrate(|sub| {
            let mut log = read_collection::<Message>(sub, keys::MESSAGES).into_vec();
            let outbox = self.lock_outbox();
            let already: HashSet<MessageId> = log.iter().map(|m| m.id.clone()).collect();
            log.extend(outbox.iter().filter(|m| !already.contains(&m.id)).cloned());
            log
        })
    }

    fn lock_outbox(&self) -> MutexGuard<'_, Vec<Message>> {
        self.outbox.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
