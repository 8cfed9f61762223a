use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::schemas::user::UserResponse;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SignupRequest {
    #[validate(email(message = "The email must be a valid email address."))]
    pub(crate) email: String,
    #[serde(alias = "fullName")]
    #[validate(length(min = 1, max = 255, message = "The name must be 1-255 characters."))]
    pub(crate) full_name: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) user: UserResponse,
}
