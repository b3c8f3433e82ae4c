//! Translation of PostgreSQL constraint violations into domain errors

use syncplane_core::AppError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

/// Maps a failed write to a domain error. `what` describes the rejected row for the message.
///
/// Foreign keys named after the organization reference become
/// [`AppError::OrganizationNotFound`]; other foreign keys become [`AppError::NotFound`].
pub(crate) fn map_write_error(err: sqlx::Error, what: &str) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        let constraint = db_err.constraint().unwrap_or("unknown").to_string();
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                tracing::warn!(%constraint, "{} rejected by unique constraint", what);
                return AppError::Conflict(format!("{} already exists ({})", what, constraint));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                tracing::warn!(%constraint, "{} references a missing row", what);
                if constraint.contains("organization") {
                    return AppError::OrganizationNotFound(format!(
                        "{} references an organization that does not exist",
                        what
                    ));
                }
                return AppError::NotFound(format!(
                    "{} references a missing row ({})",
                    what, constraint
                ));
            }
            Some(CHECK_VIOLATION) => {
                tracing::warn!(%constraint, "{} rejected by check constraint", what);
                return AppError::InvalidInput(format!("{} violates {}", what, constraint));
            }
            _ => {}
        }
    }
    AppError::Database(err)
}
