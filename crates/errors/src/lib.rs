//! mes-errors - 统一错误处理
//!
//! 基于 RFC 7807 Problem Details 规范。
//!
//! 除了通用的基础设施错误，还定义了单据下推/上拉编排所需的业务错误：
//! 不允许的流转、重复下推、无可下推明细、缺少供应商、编码模板非法、
//! 序列号分配争用、编码规则缺失。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transition not allowed: {0}")]
    TransitionNotAllowed(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Already propagated: {0}")]
    AlreadyPropagated(String),

    #[error("Nothing to push: {0}")]
    NothingToPush(String),

    #[error("Missing supplier: {0}")]
    MissingSupplier(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Allocation contention: {0}")]
    AllocationContention(String),

    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn transition_not_allowed(msg: impl Into<String>) -> Self {
        Self::TransitionNotAllowed(msg.into())
    }

    pub fn precondition_failed(msg: impl Into<String>) -> Self {
        Self::PreconditionFailed(msg.into())
    }

    pub fn already_propagated(msg: impl Into<String>) -> Self {
        Self::AlreadyPropagated(msg.into())
    }

    pub fn nothing_to_push(msg: impl Into<String>) -> Self {
        Self::NothingToPush(msg.into())
    }

    pub fn missing_supplier(msg: impl Into<String>) -> Self {
        Self::MissingSupplier(msg.into())
    }

    pub fn invalid_template(msg: impl Into<String>) -> Self {
        Self::InvalidTemplate(msg.into())
    }

    pub fn allocation_contention(msg: impl Into<String>) -> Self {
        Self::AllocationContention(msg.into())
    }

    pub fn rule_not_found(msg: impl Into<String>) -> Self {
        Self::RuleNotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn external_service(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    /// 是否属于本地有限重试后仍可能成功的争用错误
    pub fn is_contention(&self) -> bool {
        matches!(self, Self::AllocationContention(_))
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::RuleNotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::TransitionNotAllowed(_) => 422,
            Self::PreconditionFailed(_) => 422,
            Self::AlreadyPropagated(_) => 422,
            Self::NothingToPush(_) => 422,
            Self::MissingSupplier(_) => 422,
            Self::InvalidTemplate(_) => 422,
            Self::AllocationContention(_) => 409,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
            Self::Database(_) => 500,
            Self::ExternalService(_) => 502,
        }
    }

    /// 错误种类标识（稳定的机器可读标签）
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::TransitionNotAllowed(_) => "transition_not_allowed",
            Self::PreconditionFailed(_) => "precondition_failed",
            Self::AlreadyPropagated(_) => "already_propagated",
            Self::NothingToPush(_) => "nothing_to_push",
            Self::MissingSupplier(_) => "missing_supplier",
            Self::InvalidTemplate(_) => "invalid_template",
            Self::AllocationContention(_) => "allocation_contention",
            Self::RuleNotFound(_) => "rule_not_found",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal",
            Self::Database(_) => "database",
            Self::ExternalService(_) => "external_service",
        }
    }

    /// 转换为 Problem Details
    pub fn to_problem_details(&self) -> ProblemDetails {
        ProblemDetails {
            r#type: format!("https://api.mesflow.io/problems/{}", self.kind().replace('_', "-")),
            title: self.problem_title(),
            status: self.status_code(),
            detail: self.to_string(),
            instance: None,
        }
    }

    fn problem_title(&self) -> String {
        match self {
            Self::NotFound(_) => "Resource Not Found",
            Self::Validation(_) => "Validation Error",
            Self::TransitionNotAllowed(_) => "Transition Not Allowed",
            Self::PreconditionFailed(_) => "Precondition Failed",
            Self::AlreadyPropagated(_) => "Already Propagated",
            Self::NothingToPush(_) => "Nothing To Push",
            Self::MissingSupplier(_) => "Missing Supplier",
            Self::InvalidTemplate(_) => "Invalid Template",
            Self::AllocationContention(_) => "Allocation Contention",
            Self::RuleNotFound(_) => "Rule Not Found",
            Self::Conflict(_) => "Conflict",
            Self::Internal(_) => "Internal Server Error",
            Self::Database(_) => "Database Error",
            Self::ExternalService(_) => "External Service Error",
        }
        .to_string()
    }
}

/// RFC 7807 Problem Details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::not_found("demand#1").status_code(), 404);
        assert_eq!(AppError::rule_not_found("WORK_ORDER_CODE").status_code(), 404);
        assert_eq!(AppError::already_propagated("demand#1").status_code(), 422);
        assert_eq!(AppError::allocation_contention("rule#1").status_code(), 409);
        assert_eq!(AppError::database("boom").status_code(), 500);
    }

    #[test]
    fn test_problem_details() {
        let problem = AppError::missing_supplier("purchase order push").to_problem_details();
        assert_eq!(problem.status, 422);
        assert_eq!(problem.title, "Missing Supplier");
        assert!(problem.r#type.ends_with("missing-supplier"));
    }

    #[test]
    fn test_contention_classification() {
        assert!(AppError::allocation_contention("counter").is_contention());
        assert!(!AppError::conflict("edge").is_contention());
    }
}
