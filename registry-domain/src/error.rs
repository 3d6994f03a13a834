//! 领域层统一错误定义
//!
//! 聚焦编号引擎的校验失败：日期解析、序号溢出、月份映射、编号冲突与状态校验，
//! 便于在应用层统一转换为 `AppError`。所有错误均不产生部分副作用。
//!
use thiserror::Error;

/// 统一错误类型（编号引擎最小必要集）
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // --- 序号解析 ---
    #[error("unresolved supervision date: {date} is not part of the collection")]
    UnresolvedDate { date: String },
    #[error("base sequence out of range: {base_sequence} (expected 1..=999)")]
    OutOfRange { base_sequence: u32 },

    // --- 格式化/输入 ---
    #[error("invalid month: {month}")]
    InvalidMonth { month: u32 },
    #[error("invalid date: {reason}")]
    InvalidDate { reason: String },
    #[error("parse error: {reason}")]
    Parse { reason: String },

    // --- 一致性 ---
    #[error("duplicate generated number: {number}")]
    DuplicateNumber { number: String },

    // --- 领域规则/状态 ---
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },
    #[error("not found: {reason}")]
    NotFound { reason: String },
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

impl From<uuid::Error> for DomainError {
    fn from(err: uuid::Error) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for DomainError {
    fn from(err: chrono::ParseError) -> Self {
        DomainError::InvalidDate {
            reason: err.to_string(),
        }
    }
}
