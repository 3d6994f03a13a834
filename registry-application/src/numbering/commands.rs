//! 编号相关命令
//!
use registry_domain::numbering::RequestId;
use registry_domain::value_object::SupervisionDate;

use crate::command::Command;
use crate::numbering::dto::{NumberingRequestDto, RecalculationReport, SubmissionReceipt};

/// 提交新的编号请求（“取号”）
#[derive(Debug, Clone)]
pub struct SubmitNumberingRequest {
    pub requester_name: String,
    pub supervision_date: SupervisionDate,
    pub stage: String,
}

impl Command for SubmitNumberingRequest {
    const NAME: &'static str = "numbering.submit";
    type Output = SubmissionReceipt;
}

/// 基于当前集合整体重算编号（一致性修复）
#[derive(Debug, Clone, Copy, Default)]
pub struct RecalculateNumbers;

impl Command for RecalculateNumbers {
    const NAME: &'static str = "numbering.recalculate";
    type Output = RecalculationReport;
}

/// 修改未冻结请求的监督日期
#[derive(Debug, Clone, Copy)]
pub struct RescheduleNumberingRequest {
    pub id: RequestId,
    pub supervision_date: SupervisionDate,
}

impl Command for RescheduleNumberingRequest {
    const NAME: &'static str = "numbering.reschedule";
    type Output = NumberingRequestDto;
}

/// 撤回（删除）未冻结的请求
#[derive(Debug, Clone, Copy)]
pub struct WithdrawNumberingRequest {
    pub id: RequestId,
}

impl Command for WithdrawNumberingRequest {
    const NAME: &'static str = "numbering.withdraw";
    type Output = ();
}

/// 冻结已签发的编号
#[derive(Debug, Clone, Copy)]
pub struct FreezeNumberingRequest {
    pub id: RequestId,
}

impl Command for FreezeNumberingRequest {
    const NAME: &'static str = "numbering.freeze";
    type Output = NumberingRequestDto;
}
