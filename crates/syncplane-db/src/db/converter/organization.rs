use syncplane_core::models::{
    AuthProvider, Organization, OrganizationUserPermission, Permission, PermissionType, SsoConfig,
    User, UserStatus,
};
use syncplane_core::{AppError, StoredEnum};

use super::required;
use crate::db::rows::{
    OrganizationRow, OrganizationUserPermissionRow, PermissionRow, SsoConfigRow, UserRow,
};

/// The SSO realm comes from the joined `sso_config` row, never from the organization itself.
pub fn build_organization(row: OrganizationRow) -> Result<Organization, AppError> {
    Ok(Organization {
        organization_id: row.id,
        name: required(row.name, "organization.name")?,
        user_id: row.user_id,
        email: required(row.email, "organization.email")?,
        pba: row.pba,
        org_level_billing: row.org_level_billing,
        sso_realm: row.keycloak_realm,
    })
}

pub fn build_sso_config(row: SsoConfigRow) -> SsoConfig {
    SsoConfig {
        sso_config_id: row.id,
        organization_id: row.organization_id,
        keycloak_realm: row.keycloak_realm,
    }
}

pub fn build_user(row: UserRow) -> Result<User, AppError> {
    let auth_provider = required(row.auth_provider.as_deref(), "user.auth_provider")?;
    Ok(User {
        user_id: row.id,
        name: row.name,
        auth_user_id: row.auth_user_id,
        auth_provider: AuthProvider::decode(auth_provider)?,
        email: row.email,
        default_workspace_id: row.default_workspace_id,
        status: UserStatus::decode_optional(row.status.as_deref())?,
        company_name: row.company_name,
        news: row.news,
    })
}

/// Rejects rows with zero or two targets, or whose type does not fit the target.
pub fn build_permission(row: PermissionRow) -> Result<Permission, AppError> {
    let permission = Permission {
        permission_id: row.id,
        user_id: row.user_id,
        workspace_id: row.workspace_id,
        organization_id: row.organization_id,
        permission_type: PermissionType::decode(&row.permission_type)?,
    };
    permission.validate().map_err(|e| {
        tracing::warn!(permission_id = %row.id, error = %e, "stored permission is inconsistent");
        e
    })?;
    Ok(permission)
}

pub fn build_organization_user_permission(
    row: OrganizationUserPermissionRow,
) -> Result<OrganizationUserPermission, AppError> {
    Ok(OrganizationUserPermission {
        user_id: row.user_id,
        user_name: row.user_name,
        email: row.email,
        permission_type: PermissionType::decode(&row.permission_type)?,
    })
}
