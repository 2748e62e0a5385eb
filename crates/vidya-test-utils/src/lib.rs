// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test helpers shared across Vidya crates.

pub mod mock_provider;

pub use mock_provider::{MockProvider, MockScript};
