mod auth;
mod store;

pub use auth::CredentialManager;
pub use auth::CredentialState;
pub use auth::RefreshExchange;
pub use store::CredentialStore;
pub use store::FileCredentialStore;
pub use store::MemoryCredentialStore;
