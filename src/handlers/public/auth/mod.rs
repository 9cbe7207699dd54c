pub mod session;
pub mod signup;

pub use session::{login, logout};
pub use signup::signup;

use serde::Deserialize;

use crate::validator::Credentials;

/// Body of POST /signup and POST /login
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl From<CredentialsRequest> for Credentials {
    fn from(req: CredentialsRequest) -> Self {
        Self {
            email: req.email.trim().to_string(),
            password: req.password,
        }
    }
}
