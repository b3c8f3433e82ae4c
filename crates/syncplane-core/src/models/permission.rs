use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

crate::stored_enum! {
    /// Role granted to a user on a workspace or an organization
    pub enum PermissionType {
        OrganizationAdmin => "organization_admin",
        OrganizationEditor => "organization_editor",
        OrganizationReader => "organization_reader",
        OrganizationMember => "organization_member",
        WorkspaceOwner => "workspace_owner",
        WorkspaceAdmin => "workspace_admin",
        WorkspaceEditor => "workspace_editor",
        WorkspaceReader => "workspace_reader",
    }
}

impl PermissionType {
    pub fn is_organization_level(&self) -> bool {
        matches!(
            self,
            PermissionType::OrganizationAdmin
                | PermissionType::OrganizationEditor
                | PermissionType::OrganizationReader
                | PermissionType::OrganizationMember
        )
    }

    pub fn is_workspace_level(&self) -> bool {
        !self.is_organization_level()
    }

    /// Rank within the permission's own level; higher grants more.
    pub fn rank(&self) -> u8 {
        match self {
            PermissionType::OrganizationAdmin | PermissionType::WorkspaceOwner => 4,
            PermissionType::OrganizationEditor | PermissionType::WorkspaceAdmin => 3,
            PermissionType::OrganizationReader | PermissionType::WorkspaceEditor => 2,
            PermissionType::OrganizationMember | PermissionType::WorkspaceReader => 1,
        }
    }

    /// True when `self` grants at least what `other` grants. Types of different levels never
    /// include each other.
    pub fn includes(&self, other: &PermissionType) -> bool {
        self.is_organization_level() == other.is_organization_level() && self.rank() >= other.rank()
    }
}

/// Resource a permission is granted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionTarget {
    Workspace(Uuid),
    Organization(Uuid),
}

/// A grant of a role to a user on exactly one workspace or organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub permission_id: Uuid,
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    pub permission_type: PermissionType,
}

impl Permission {
    pub fn for_organization(
        user_id: Uuid,
        organization_id: Uuid,
        permission_type: PermissionType,
    ) -> Self {
        Self {
            permission_id: Uuid::new_v4(),
            user_id,
            workspace_id: None,
            organization_id: Some(organization_id),
            permission_type,
        }
    }

    pub fn for_workspace(user_id: Uuid, workspace_id: Uuid, permission_type: PermissionType) -> Self {
        Self {
            permission_id: Uuid::new_v4(),
            user_id,
            workspace_id: Some(workspace_id),
            organization_id: None,
            permission_type,
        }
    }

    /// Resolves the single target, rejecting zero or two targets.
    pub fn target(&self) -> Result<PermissionTarget, AppError> {
        match (self.workspace_id, self.organization_id) {
            (Some(ws), None) => Ok(PermissionTarget::Workspace(ws)),
            (None, Some(org)) => Ok(PermissionTarget::Organization(org)),
            (Some(_), Some(_)) => Err(AppError::InvalidInput(format!(
                "Permission {} targets both a workspace and an organization",
                self.permission_id
            ))),
            (None, None) => Err(AppError::InvalidInput(format!(
                "Permission {} has neither a workspace nor an organization",
                self.permission_id
            ))),
        }
    }

    /// Single target and a permission type that matches the target's level.
    pub fn validate(&self) -> Result<(), AppError> {
        let level_matches = match self.target()? {
            PermissionTarget::Workspace(_) => self.permission_type.is_workspace_level(),
            PermissionTarget::Organization(_) => self.permission_type.is_organization_level(),
        };
        if !level_matches {
            return Err(AppError::InvalidInput(format!(
                "Permission type {} does not match the target of permission {}",
                self.permission_type, self.permission_id
            )));
        }
        Ok(())
    }
}

/// A member of an organization together with their organization-level role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationUserPermission {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub permission_type: PermissionType,
}

/// Paging parameters for listing resources visible to one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcesByUserQueryPaginated {
    pub user_id: Uuid,
    /// Accepted for parity with other resource listings. Organizations are never soft-deleted,
    /// so this has no effect on organization queries.
    #[serde(default)]
    pub include_deleted: bool,
    pub page_size: i32,
    pub row_offset: i32,
}

impl ResourcesByUserQueryPaginated {
    pub fn new(user_id: Uuid, page_size: i32, row_offset: i32) -> Self {
        Self {
            user_id,
            include_deleted: false,
            page_size,
            row_offset,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.page_size <= 0 {
            return Err(AppError::InvalidInput(format!(
                "page_size must be greater than 0, got {}",
                self.page_size
            )));
        }
        if self.row_offset < 0 {
            return Err(AppError::InvalidInput(format!(
                "row_offset must not be negative, got {}",
                self.row_offset
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_rank_order() {
        assert!(PermissionType::OrganizationAdmin.includes(&PermissionType::OrganizationEditor));
        assert!(PermissionType::OrganizationEditor.includes(&PermissionType::OrganizationReader));
        assert!(PermissionType::OrganizationReader.includes(&PermissionType::OrganizationMember));
        assert!(!PermissionType::OrganizationMember.includes(&PermissionType::OrganizationReader));
        assert!(!PermissionType::OrganizationAdmin.includes(&PermissionType::WorkspaceReader));
    }

    #[test]
    fn test_single_target_enforced() {
        let mut p = Permission::for_organization(
            Uuid::new_v4(),
            Uuid::new_v4(),
            PermissionType::OrganizationReader,
        );
        assert!(p.validate().is_ok());

        p.workspace_id = Some(Uuid::new_v4());
        assert!(matches!(p.validate(), Err(AppError::InvalidInput(_))));

        p.workspace_id = None;
        p.organization_id = None;
        assert!(matches!(p.target(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_type_must_match_target_level() {
        let p = Permission::for_workspace(
            Uuid::new_v4(),
            Uuid::new_v4(),
            PermissionType::OrganizationAdmin,
        );
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("organization_admin"));
    }

    #[test]
    fn test_paging_validation() {
        let user = Uuid::new_v4();
        assert!(ResourcesByUserQueryPaginated::new(user, 10, 0).validate().is_ok());
        assert!(ResourcesByUserQueryPaginated::new(user, 0, 0).validate().is_err());
        assert!(ResourcesByUserQueryPaginated::new(user, -1, 0).validate().is_err());
        assert!(ResourcesByUserQueryPaginated::new(user, 10, -5).validate().is_err());
    }
}
