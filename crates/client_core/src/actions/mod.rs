//! Domain actions built on top of the [`ActionPipeline`].

mod auth;
mod cleanings;
mod feed;
mod offers;

use std::sync::Arc;

use anyhow::Result;

pub use feed::DEFAULT_PAGE_CHUNK_SIZE;

use crate::{
    config::Settings,
    credentials::CredentialStore,
    pipeline::ActionPipeline,
    store::{AppState, Store},
    transport::{HttpTransport, Transport},
};

pub struct MarketplaceClient {
    pipeline: ActionPipeline,
    credentials: Arc<dyn CredentialStore>,
}

impl MarketplaceClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        store: Arc<Store>,
    ) -> Self {
        Self {
            pipeline: ActionPipeline::new(transport, store),
            credentials,
        }
    }

    /// Wires an HTTP transport against the configured API base and a fresh store.
    pub fn from_settings(settings: &Settings, credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        let base_url = settings.api_base_url()?;
        let transport = match settings.request_timeout() {
            Some(timeout) => HttpTransport::with_timeout(base_url, credentials.clone(), timeout)?,
            None => HttpTransport::new(base_url, credentials.clone()),
        };
        Ok(Self::new(Arc::new(transport), credentials, Store::new()))
    }

    pub fn store(&self) -> &Arc<Store> {
        self.pipeline.store()
    }

    pub fn pipeline(&self) -> &ActionPipeline {
        &self.pipeline
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    pub fn state(&self) -> AppState {
        self.store().snapshot()
    }
}

#[cfg(test)]
#[path = "../tests/actions_tests.rs"]
mod tests;
