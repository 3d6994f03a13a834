//! 序号解析器（Sequence Resolver）
//!
//! 对给定集合计算两个序数：
//! - `base_sequence`：请求的监督日期在所有不同日期（按时间升序）中的 1 起位置；
//! - `tie_break_index`：请求在同日请求（按 `created_at`、`id` 升序）中的 0 起位置。
//!
//! 结果只依赖集合内容，与调用方的迭代顺序无关。
//!
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::numbering::request::{NumberingRequest, RequestId};
use crate::value_object::SupervisionDate;

/// 解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequencePosition {
    /// 1 起的日期序号
    pub base_sequence: u32,
    /// 0 起的同日次序
    pub tie_break_index: u32,
}

/// 按日期分组、组内排序后的集合快照
///
/// 一次构建，可对集合内任意请求反复查询，批量重算时避免重复排序。
#[derive(Debug, Clone, Default)]
pub struct SequenceIndex {
    groups: BTreeMap<SupervisionDate, Vec<(DateTime<Utc>, RequestId)>>,
}

impl SequenceIndex {
    pub fn build<'a, I>(requests: I) -> Self
    where
        I: IntoIterator<Item = &'a NumberingRequest>,
    {
        let mut groups: BTreeMap<SupervisionDate, Vec<_>> = BTreeMap::new();
        for request in requests {
            groups
                .entry(request.supervision_date())
                .or_default()
                .push(request.ordering_key());
        }
        for group in groups.values_mut() {
            group.sort_unstable();
            group.dedup();
        }
        Self { groups }
    }

    /// 不同监督日期的数量
    pub fn date_count(&self) -> usize {
        self.groups.len()
    }

    pub fn position_of(&self, target: &NumberingRequest) -> DomainResult<SequencePosition> {
        let date = target.supervision_date();
        let unresolved = || DomainError::UnresolvedDate {
            date: date.to_string(),
        };

        let group = self.groups.get(&date).ok_or_else(unresolved)?;
        let base_sequence = u32::try_from(self.groups.range(..date).count() + 1)
            .map_err(|_| DomainError::OutOfRange {
                base_sequence: u32::MAX,
            })?;
        let tie_break_index = group
            .iter()
            .position(|(_, id)| id == target.id())
            .ok_or_else(unresolved)?;
        let tie_break_index =
            u32::try_from(tie_break_index).map_err(|_| DomainError::InvalidState {
                reason: format!("too many requests on {date}"),
            })?;

        Ok(SequencePosition {
            base_sequence,
            tie_break_index,
        })
    }
}

/// 对集合（插入后的状态）解析目标请求的位置
pub fn resolve(
    target: &NumberingRequest,
    all_requests: &[NumberingRequest],
) -> DomainResult<SequencePosition> {
    SequenceIndex::build(all_requests).position_of(target)
}
