//! Mapping of SQLx failures onto the domain error model.
//!
//! | SQLx Error | PostgreSQL Error Code | DomainError |
//! |------------|----------------------|-------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (check constraint violation) | `23514` | `Validation` |
//! | Database (other) | Any other | `Unavailable` |
//! | PoolClosed / Io / Tls / PoolTimedOut | N/A | `Unavailable` |
//! | RowNotFound | N/A | `NotFound` |
//! | Other | N/A | `Unavailable` |

use newsroom_core::DomainError;

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => DomainError::conflict(msg),
                Some("23514") => DomainError::validation(msg),
                _ => DomainError::unavailable(msg),
            }
        }
        sqlx::Error::RowNotFound => DomainError::NotFound,
        sqlx::Error::PoolClosed => {
            DomainError::unavailable(format!("connection pool closed in {}", operation))
        }
        _ => DomainError::unavailable(format!("sqlx error in {}: {}", operation, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_level_failures_are_unavailable() {
        let err = map_sqlx_error("find_by_email", sqlx::Error::PoolClosed);
        assert_eq!(
            err,
            DomainError::unavailable("connection pool closed in find_by_email")
        );

        let err = map_sqlx_error("find_by_email", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DomainError::Unavailable(_)));
    }

    #[test]
    fn row_not_found_is_not_found() {
        assert_eq!(
            map_sqlx_error("set_role", sqlx::Error::RowNotFound),
            DomainError::NotFound
        );
    }
}
