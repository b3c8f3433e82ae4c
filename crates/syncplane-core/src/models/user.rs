use serde::{Deserialize, Serialize};
use uuid::Uuid;

crate::stored_enum! {
    /// Identity provider that authenticated the user
    pub enum AuthProvider {
        Airbyte => "airbyte",
        GoogleIdentityPlatform => "google_identity_platform",
        Keycloak => "keycloak",
    }
}

crate::stored_enum! {
    pub enum UserStatus {
        Invited => "invited",
        Registered => "registered",
        Disabled => "disabled",
    }
}

/// Platform user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub auth_user_id: String,
    pub auth_provider: AuthProvider,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_workspace_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news: Option<bool>,
}
