// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat relay for the Vidya education backend.
//!
//! Turns one user message into one assistant reply using an ordered chain
//! of inference providers (RAG service first, direct LLM as fallback, a
//! fixed degradation message as the floor), while maintaining per-session
//! conversation continuity and steering the reply language.

pub mod chain;
pub mod event;
pub mod prompt;
pub mod relay;
pub mod session;

pub use chain::ProviderChain;
pub use event::{RelayEvent, RelayEventStream};
pub use prompt::{DEFAULT_LANGUAGE, language_name, system_prompt};
pub use relay::{ChatOutcome, ChatRelay, apology_for};
pub use session::{append_turn, get_or_create_session};
