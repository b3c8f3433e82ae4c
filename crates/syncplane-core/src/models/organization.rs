use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Top-level tenant grouping workspaces and users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub organization_id: Uuid,
    pub name: String,
    pub user_id: Option<Uuid>,
    pub email: String,
    /// Partner billing account
    pub pba: bool,
    pub org_level_billing: bool,
    /// Keycloak realm of the organization's SSO config. Read-only: filled from the join on
    /// reads and ignored on writes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sso_realm: Option<String>,
}

impl Organization {
    pub fn new(organization_id: Uuid, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            organization_id,
            name: name.into(),
            user_id: None,
            email: email.into(),
            pba: false,
            org_level_billing: false,
            sso_realm: None,
        }
    }
}

/// Sparse update of an organization. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationPatch {
    pub organization_id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub user_id: Option<Option<Uuid>>, // Option<Option> to distinguish between None (no change) and Some(None) (clear)
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub pba: Option<bool>,
    #[serde(default)]
    pub org_level_billing: Option<bool>,
}

impl OrganizationPatch {
    pub fn new(organization_id: Uuid) -> Self {
        Self {
            organization_id,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.user_id.is_none()
            && self.email.is_none()
            && self.pba.is_none()
            && self.org_level_billing.is_none()
    }
}

/// An explicit `null` becomes `Some(None)`; an omitted key stays `None` through `default`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Single sign-on configuration, at most one per organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsoConfig {
    pub sso_config_id: Uuid,
    pub organization_id: Uuid,
    pub keycloak_realm: String,
}
