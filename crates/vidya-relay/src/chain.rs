// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered provider fallback chain.
//!
//! Providers are tried in configuration order. Every provider except the
//! last must pass a bounded health probe before its chat call is attempted;
//! the last one is the last resort and is called regardless, so its failure
//! (not the probe) produces the diagnostic the caller degrades with.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use vidya_core::{
    ChatProvider, ChatReply, ChatRequest, ChunkStream, ProviderErrorKind, VidyaError,
};

/// The fallback chain. Cheap to clone; providers are shared.
#[derive(Clone)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn ChatProvider>>,
    probe_timeout: Duration,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn ChatProvider>>, probe_timeout: Duration) -> Self {
        Self {
            providers,
            probe_timeout,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Bounded health probe; a timed-out probe reads as unhealthy.
    async fn probe(&self, provider: &dyn ChatProvider) -> bool {
        match tokio::time::timeout(self.probe_timeout, provider.health_check()).await {
            Ok(Ok(status)) => status.is_usable(),
            Ok(Err(e)) => {
                warn!(provider = provider.name(), %e, "health probe errored");
                false
            }
            Err(_) => {
                warn!(
                    provider = provider.name(),
                    timeout = ?self.probe_timeout,
                    "health probe timed out"
                );
                false
            }
        }
    }

    /// Single-shot call through the chain.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, VidyaError> {
        let mut last_error = None;

        let count = self.providers.len();
        for (index, provider) in self.providers.iter().enumerate() {
            let is_last = index + 1 == count;
            if !is_last && !self.probe(provider.as_ref()).await {
                info!(provider = provider.name(), "provider unavailable, trying next");
                last_error = Some(VidyaError::provider(
                    format!("{} failed its health probe", provider.name()),
                    ProviderErrorKind::ConnectionRefused,
                ));
                continue;
            }

            match provider.chat(request).await {
                Ok(reply) => {
                    info!(provider = provider.name(), "chat served");
                    return Ok(reply);
                }
                Err(e) => {
                    warn!(provider = provider.name(), %e, "chat failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            VidyaError::provider("no chat providers configured", ProviderErrorKind::Upstream)
        }))
    }

    /// Open a stream through the chain. Falls back only while no provider
    /// has produced output: once a stream is open, mid-flight failures are
    /// the caller's to surface.
    pub async fn open_stream(&self, request: &ChatRequest) -> Result<ChunkStream, VidyaError> {
        let mut last_error = None;

        let count = self.providers.len();
        for (index, provider) in self.providers.iter().enumerate() {
            let is_last = index + 1 == count;
            if !is_last && !self.probe(provider.as_ref()).await {
                info!(provider = provider.name(), "provider unavailable, trying next");
                last_error = Some(VidyaError::provider(
                    format!("{} failed its health probe", provider.name()),
                    ProviderErrorKind::ConnectionRefused,
                ));
                continue;
            }

            match provider.chat_stream(request).await {
                Ok(stream) => {
                    info!(provider = provider.name(), "stream opened");
                    return Ok(stream);
                }
                Err(e) => {
                    warn!(provider = provider.name(), %e, "stream open failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            VidyaError::provider("no chat providers configured", ProviderErrorKind::Upstream)
        }))
    }
}
