use serde::{Deserialize, Serialize};

/// JWT payload issued at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,    // account email, as stored
    pub username: String, // display name
    pub iat: usize,       // issued at (unix timestamp)
    pub exp: usize,       // expires at (unix timestamp)
}
