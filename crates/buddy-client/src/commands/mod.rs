//! Command handlers, one per user action.
//!
//! Each sub-module groups related commands by domain. Every command takes
//! the [`SharedState`](crate::state::SharedState), locks it for the duration
//! of the call and returns a [`ClientError`](crate::error::ClientError) whose
//! text can be shown to the user as is.

pub mod auth;
pub mod catalog;
pub mod messaging;
pub mod profile;
pub mod settings;
