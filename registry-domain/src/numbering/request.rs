//! 编号请求实体（NumberingRequest）
//!
//! 引擎唯一涉及的实体。`supervision_date`、`created_at` 与 `id` 决定编号，
//! `generated_number` 为派生字段，只由重算写入。
//!
use std::fmt;
use std::str::FromStr;

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::specification::{IsFrozen, IsNumbered, Specification};
use crate::value_object::SupervisionDate;

/// 请求标识（UUID v7，按时间有序，作为同一时间戳下的最终排序键）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub const fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// 表单层提交的部分请求（尚无 id / created_at）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNumberingRequest {
    pub requester_name: String,
    pub supervision_date: SupervisionDate,
    pub stage: String,
}

impl NewNumberingRequest {
    /// 由调用方分配标识与创建时间后生成完整请求
    pub fn into_request(self, id: RequestId, created_at: DateTime<Utc>) -> NumberingRequest {
        NumberingRequest {
            id,
            supervision_date: self.supervision_date,
            created_at,
            stage: self.stage,
            requester_name: self.requester_name,
            generated_number: None,
            frozen: false,
        }
    }
}

/// 编号请求
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingRequest {
    #[builder(default)]
    id: RequestId,
    supervision_date: SupervisionDate,
    #[builder(default = Utc::now())]
    created_at: DateTime<Utc>,
    #[builder(into, default)]
    stage: String,
    #[builder(into, default)]
    requester_name: String,
    #[builder(into)]
    generated_number: Option<String>,
    #[builder(default)]
    #[serde(default)]
    frozen: bool,
}

impl NumberingRequest {
    pub fn supervision_date(&self) -> SupervisionDate {
        self.supervision_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn requester_name(&self) -> &str {
        &self.requester_name
    }

    pub fn generated_number(&self) -> Option<&str> {
        self.generated_number.as_deref()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// 同日分组内的排序键：先按创建时间，再按 id
    pub fn ordering_key(&self) -> (DateTime<Utc>, RequestId) {
        (self.created_at, self.id)
    }

    /// 冻结编号：此后重算保留现有编号，日期不可再修改
    pub fn freeze(&mut self) -> DomainResult<()> {
        if !IsNumbered.is_satisfied_by(self) {
            return Err(DomainError::InvalidState {
                reason: format!("request {} has no generated number to freeze", self.id),
            });
        }
        self.frozen = true;
        Ok(())
    }

    /// 修改监督日期；旧编号作废，等待下一次重算
    pub fn reschedule(&mut self, date: SupervisionDate) -> DomainResult<()> {
        if IsFrozen.is_satisfied_by(self) {
            return Err(DomainError::InvalidState {
                reason: format!("request {} is frozen", self.id),
            });
        }
        if self.supervision_date != date {
            self.supervision_date = date;
            self.generated_number = None;
        }
        Ok(())
    }

    pub(crate) fn assign_number(&mut self, number: String) {
        self.generated_number = Some(number);
    }
}

impl Entity for NumberingRequest {
    type Id = RequestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
