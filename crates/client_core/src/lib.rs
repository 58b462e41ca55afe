use std::sync::Arc;

pub mod admin;
pub mod config;
pub mod session;
pub mod storefront;
pub mod transport;

pub use admin::{AdminClient, FormOptions};
pub use config::{load_settings, ClientSettings};
pub use session::{AdminSession, FileTokenStore, MemoryTokenStore, TokenStore};
pub use storefront::{Listing, StorefrontClient, WithProducts};
pub use transport::{ApiRequest, ApiTransport, EndpointFamily};

/// Storefront and admin clients sharing one transport and one session.
#[derive(Clone)]
pub struct UrbanSpaceClient {
    pub storefront: StorefrontClient,
    pub admin: AdminClient,
}

impl UrbanSpaceClient {
    pub fn new(api_base_url: impl Into<String>, session: Arc<AdminSession>) -> Self {
        let transport = ApiTransport::new(api_base_url);
        Self {
            storefront: StorefrontClient::new(transport.clone()),
            admin: AdminClient::new(transport, session),
        }
    }

    /// Public browsing never depends on the session file: an unreadable one
    /// only costs the persisted admin login.
    pub async fn from_settings(settings: &ClientSettings) -> Self {
        let store = Arc::new(FileTokenStore::new(&settings.session_file));
        let session = AdminSession::restore_or_signed_out(store).await;
        Self::new(settings.api_base_url.clone(), Arc::new(session))
    }
}

#[cfg(test)]
#[path = "tests/stub_backend.rs"]
mod stub_backend;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
