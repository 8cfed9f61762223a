use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::User;

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) full_name: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            created_at: format_primitive(user.created_at),
        }
    }
}
