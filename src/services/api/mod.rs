pub mod accounts;
pub mod http;

pub use accounts::AccountsClient;
pub use http::{ApiClientConfig, AuthContext};
