use serde::{Deserialize, Serialize};

/// Bearer token claims. Tokens are issued by the identity service and only
/// validated here.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub employee_id: u64,
    pub role: u8, // role id
    pub exp: usize,

    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
