use serde::{Deserialize, Serialize};

use crate::users::repo_types::User;

/// User snapshot embedded in a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserClaim {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserClaim {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthClaims {
    pub user: UserClaim,
    pub sub: String, // user email
    pub iat: i64,    // issued at (unix timestamp)
    pub exp: i64,    // expires at (unix timestamp)
}
