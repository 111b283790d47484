pub mod aggregate;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod fanout;
pub mod models;
pub mod pages;
pub mod report;
pub mod routes;
pub mod session;
pub mod storage; // report image uploads

// Re-export commonly used items for the binary / external users
pub use api::{HttpApi, LostFoundApi};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use session::{Credential, FileSessionStore, MemorySessionStore, SessionStore};
