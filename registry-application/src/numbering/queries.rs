use registry_domain::numbering::RequestId;

use crate::numbering::dto::NumberingRequestDto;
use crate::query::Query;

/// 取号历史：按创建时间倒序，截取一页
#[derive(Debug, Clone, Copy, Default)]
pub struct ListNumberingRequests {
    /// 为空时使用配置的默认分页大小
    pub page_size: Option<usize>,
}

impl Query for ListNumberingRequests {
    const NAME: &'static str = "numbering.list";
    type Dto = Vec<NumberingRequestDto>;
}

#[derive(Debug, Clone, Copy)]
pub struct GetNumberingRequest {
    pub id: RequestId,
}

impl Query for GetNumberingRequest {
    const NAME: &'static str = "numbering.get";
    type Dto = Option<NumberingRequestDto>;
}
