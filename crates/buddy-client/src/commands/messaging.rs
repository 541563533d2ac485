use serde::Serialize;
use tracing::{debug, info, warn};

use buddy_store::{ItemId, Message, SentMessage, SyncStatus, User, UserId};

use crate::error::{ClientError, Result};
use crate::state::{lock, SharedState};

/// An open chat with one counterpart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoom {
    pub recipient: User,
    pub messages: Vec<Message>,
    /// Text to prefill the input with.
    pub draft: String,
}

/// One row of the chat list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub user: User,
    pub last_message: Message,
}

pub fn enquiry_text(title: &str) -> String {
    format!("Hi! I'm interested in your listing \"{title}\". Is it still available?")
}

/// Open the chat with `recipient`. Coming from a listing (`item`) with no
/// prior messages prefills an enquiry about it.
pub fn open_chat(state: &SharedState, recipient: &UserId, item: Option<&ItemId>) -> Result<ChatRoom> {
    let guard = lock(state)?;
    let me = guard.current_user()?;
    if &me.id == recipient {
        return Err(ClientError::SelfChat);
    }

    let messages = guard.database.messages_between(&me.id, recipient);
    let draft = match item.and_then(|id| guard.catalog.get(id)) {
        Some(listing) if messages.is_empty() => enquiry_text(&listing.title),
        _ => String::new(),
    };

    Ok(ChatRoom {
        recipient: guard.database.resolve_user(recipient),
        messages,
        draft,
    })
}

/// Send `text`, trimmed. The message comes back even when it could not be
/// written yet; check [`SentMessage::sync`].
pub fn send_chat_message(
    state: &SharedState,
    recipient: &UserId,
    text: &str,
    item: Option<ItemId>,
) -> Result<SentMessage> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ClientError::EmptyMessage);
    }

    let guard = lock(state)?;
    let me = guard.current_user()?;
    if &me.id == recipient {
        return Err(ClientError::SelfChat);
    }

    let sent = guard.database.send_message(&me.id, recipient, text, item);
    match sent.sync {
        SyncStatus::Persisted => debug!(message_id = %sent.message.id, "chat message sent"),
        SyncStatus::Unsynced => warn!(message_id = %sent.message.id, "chat message queued"),
    }
    Ok(sent)
}

/// Chats of the signed-in user, most recent activity first.
pub fn conversations(state: &SharedState) -> Result<Vec<ConversationSummary>> {
    let guard = lock(state)?;
    let me = &guard.current_user()?.id;

    let mut chats: Vec<ConversationSummary> = guard
        .database
        .conversations_for(me)
        .into_iter()
        .filter_map(|other| {
            let last_message = guard.database.messages_between(me, &other).pop()?;
            Some(ConversationSummary {
                user: guard.database.resolve_user(&other),
                last_message,
            })
        })
        .collect();

    chats.sort_by(|a, b| b.last_message.timestamp.cmp(&a.last_message.timestamp));
    Ok(chats)
}

/// Retry messages that could not be written when sent.
pub fn retry_unsynced(state: &SharedState) -> Result<usize> {
    let guard = lock(state)?;
    let written = guard.database.flush_outbox()?;
    if written > 0 {
        info!(count = written, "queued messages written");
    }
    Ok(written)
}
