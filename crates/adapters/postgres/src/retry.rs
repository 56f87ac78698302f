//! sqlx 错误分类
//!
//! 判断数据库错误是否为瞬时错误（可重试）或锁冲突

/// 判断错误消息是否可重试
pub fn is_retryable_error(error: &str) -> bool {
    let retryable_patterns = [
        "connection refused",
        "connection reset",
        "connection timed out",
        "timeout",
        "temporarily unavailable",
        "too many connections",
        "econnrefused",
        "etimedout",
        "econnreset",
        "broken pipe",
        "connection closed",
        "could not connect",
        "no route to host",
        "server closed the connection",
        "deadlock detected",
        "serialization failure",
    ];

    let error_lower = error.to_lowercase();
    retryable_patterns
        .iter()
        .any(|pattern| error_lower.contains(pattern))
}

/// 判断 sqlx 错误是否可重试
pub fn is_sqlx_retryable(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Io(_) => true,
        sqlx::Error::Tls(_) => true,
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::PoolClosed => false,
        sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => {
            // PostgreSQL 错误码
            // 40001: serialization_failure
            // 40P01: deadlock_detected
            // 57P01: admin_shutdown
            // 57P03: cannot_connect_now
            // 08000: connection_exception
            // 08006: connection_failure
            if let Some(code) = db_err.code() {
                matches!(
                    code.as_ref(),
                    "40001" | "40P01" | "57P01" | "57P03" | "08000" | "08006"
                )
            } else {
                is_retryable_error(&db_err.to_string())
            }
        }
        _ => is_retryable_error(&error.to_string()),
    }
}

/// 判断 sqlx 错误是否为锁冲突
///
/// 40001: serialization_failure
/// 40P01: deadlock_detected
/// 55P03: lock_not_available（FOR UPDATE NOWAIT 抢锁失败）
pub fn is_lock_conflict(error: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = error {
        if let Some(code) = db_err.code() {
            return matches!(code.as_ref(), "40001" | "40P01" | "55P03");
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable_error() {
        assert!(is_retryable_error("connection refused"));
        assert!(is_retryable_error("Connection timed out"));
        assert!(is_retryable_error("econnrefused"));
        assert!(is_retryable_error("broken pipe"));
        assert!(is_retryable_error("deadlock detected"));
        assert!(is_retryable_error("serialization failure"));
        assert!(!is_retryable_error("unique constraint violation"));
        assert!(!is_retryable_error("foreign key violation"));
    }

    #[test]
    fn test_is_sqlx_retryable_pool_errors() {
        assert!(is_sqlx_retryable(&sqlx::Error::PoolTimedOut));
        assert!(is_sqlx_retryable(&sqlx::Error::WorkerCrashed));
        assert!(!is_sqlx_retryable(&sqlx::Error::PoolClosed));
        assert!(!is_sqlx_retryable(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn test_is_lock_conflict_non_database_errors() {
        assert!(!is_lock_conflict(&sqlx::Error::PoolTimedOut));
        assert!(!is_lock_conflict(&sqlx::Error::RowNotFound));
    }
}
