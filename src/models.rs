use serde::{Deserialize, Serialize};

/// Claims of tokens issued by the identity service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username; attendance rows are keyed by it.
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,

    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
