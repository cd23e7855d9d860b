pub mod actions;
pub mod config;
pub mod credentials;
pub mod events;
pub mod pipeline;
pub mod reducers;
pub mod selectors;
pub mod store;
pub mod transport;
pub mod validation;

pub use actions::{MarketplaceClient, DEFAULT_PAGE_CHUNK_SIZE};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use events::{Operation, Payload, Phase, StoreEvent};
pub use pipeline::{ActionPipeline, Outcome, RequestDescriptor};
pub use store::{AppState, Store};
pub use transport::{HttpTransport, Transport};
