// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Uniform event contract for the streaming relay.

use std::pin::Pin;

use futures::Stream;

/// One event of a streaming chat exchange.
///
/// A well-formed stream is zero or more `Chunk`s followed by exactly one
/// terminal `Done` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// One decoded increment of assistant text.
    Chunk(String),
    /// Terminal: the exchange completed and was persisted.
    Done {
        session_id: String,
        full_response: String,
    },
    /// Terminal: the exchange could not complete.
    Error(String),
}

impl RelayEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RelayEvent::Chunk(_))
    }
}

pub type RelayEventStream = Pin<Box<dyn Stream<Item = RelayEvent> + Send>>;
