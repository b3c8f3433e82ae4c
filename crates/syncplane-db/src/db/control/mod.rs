pub mod organization;
pub mod permission;
pub mod user;

pub use organization::OrganizationRepository;
pub use permission::PermissionRepository;
pub use user::UserRepository;
