pub mod credentials;
pub mod manager;
pub mod password;
pub mod session;

pub use credentials::CredentialError;
pub use manager::{SessionManager, SharedSession};
pub use session::Session;
