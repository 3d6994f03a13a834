//! 重算驱动（Recalculation Driver）
//!
//! 每次都基于完整集合重新推导编号，不保存任何计数器。
//! 已冻结的请求保留原编号；先计算全部结果再统一写回，失败时不修改任何请求。
//!
use std::collections::HashSet;

use tracing::debug;

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::numbering::formatter::format_position;
use crate::numbering::request::{NumberingRequest, RequestId};
use crate::numbering::resolver::SequenceIndex;
use crate::specification::{IsFrozen, Specification};

/// 计算集合内每个请求应持有的编号（与输入同序），不修改输入
pub fn assign_numbers(requests: &[NumberingRequest]) -> DomainResult<Vec<(RequestId, String)>> {
    let index = SequenceIndex::build(requests);
    let mut seen = HashSet::with_capacity(requests.len());
    let mut assignments = Vec::with_capacity(requests.len());

    for request in requests {
        let number = match request.generated_number() {
            Some(existing) if IsFrozen.is_satisfied_by(request) => existing.to_string(),
            _ => format_position(index.position_of(request)?, request.supervision_date())?,
        };
        if !seen.insert(number.clone()) {
            return Err(DomainError::DuplicateNumber { number });
        }
        assignments.push((*request.id(), number));
    }

    Ok(assignments)
}

/// 原地刷新所有编号，返回编号发生变化的请求数
pub fn recalculate_in_place(requests: &mut [NumberingRequest]) -> DomainResult<usize> {
    let assignments = assign_numbers(requests)?;
    let mut changed = 0;

    for (request, (_, number)) in requests.iter_mut().zip(assignments) {
        if request.generated_number() != Some(number.as_str()) {
            changed += 1;
            request.assign_number(number);
        }
    }

    debug!(
        total = requests.len(),
        changed = changed,
        "recalculated generated numbers"
    );
    Ok(changed)
}

/// 基于同一固定集合刷新每个请求的编号
pub fn recalculate_all(mut requests: Vec<NumberingRequest>) -> DomainResult<Vec<NumberingRequest>> {
    recalculate_in_place(&mut requests)?;
    Ok(requests)
}

/// 为新提交的请求计算编号
///
/// `new_request` 须已分配 id 与 created_at；它会被并入集合后再解析，
/// 与调用方稍后持久化的集合状态一致。
pub fn compute_number_for_new_request(
    new_request: &NumberingRequest,
    existing_requests: &[NumberingRequest],
) -> DomainResult<String> {
    let collection = existing_requests
        .iter()
        .filter(|r| r.id() != new_request.id())
        .chain(std::iter::once(new_request));
    let index = SequenceIndex::build(collection);

    let number = format_position(
        index.position_of(new_request)?,
        new_request.supervision_date(),
    )?;

    let collides = existing_requests
        .iter()
        .filter(|r| IsFrozen.is_satisfied_by(*r))
        .any(|r| r.generated_number() == Some(number.as_str()));
    if collides {
        return Err(DomainError::DuplicateNumber { number });
    }

    debug!(request_id = %new_request.id(), number = %number, "computed number for new request");
    Ok(number)
}
