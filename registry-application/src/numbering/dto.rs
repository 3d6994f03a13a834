use chrono::{DateTime, Utc};
use registry_domain::entity::Entity;
use registry_domain::numbering::NumberingRequest;
use serde::Serialize;

use crate::dto::Dto;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberingRequestDto {
    pub id: String,
    pub requester_name: String,
    pub supervision_date: String,
    pub stage: String,
    pub created_at: DateTime<Utc>,
    pub generated_number: Option<String>,
    pub frozen: bool,
}

impl Dto for NumberingRequestDto {}

impl From<&NumberingRequest> for NumberingRequestDto {
    fn from(r: &NumberingRequest) -> Self {
        Self {
            id: r.id().to_string(),
            requester_name: r.requester_name().to_string(),
            supervision_date: r.supervision_date().to_string(),
            stage: r.stage().to_string(),
            created_at: r.created_at(),
            generated_number: r.generated_number().map(str::to_string),
            frozen: r.is_frozen(),
        }
    }
}

/// 取号结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub request: NumberingRequestDto,
    /// 因本次提交（例如补录更早日期）而改号的其他请求数
    pub renumbered: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecalculationReport {
    pub total: usize,
    pub changed: usize,
}
