//! 编号用例（应用层）
//!
//! 命令、查询与 `NumberingService` 处理器，以及一键注册到总线的辅助函数。
//!
mod commands;
mod dto;
mod queries;
mod service;

pub use commands::{
    FreezeNumberingRequest, RecalculateNumbers, RescheduleNumberingRequest,
    SubmitNumberingRequest, WithdrawNumberingRequest,
};
pub use dto::{NumberingRequestDto, RecalculationReport, SubmissionReceipt};
pub use queries::{GetNumberingRequest, ListNumberingRequests};
pub use service::{NumberingService, register_numbering_handlers};
