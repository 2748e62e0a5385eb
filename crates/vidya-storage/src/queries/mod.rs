// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. Each function takes `&Database` and runs inside
//! the single-writer connection thread.

pub mod chat;
pub mod progress;
pub mod users;
