//! 编号引擎（numbering）
//!
//! 为“监督”编号请求生成顺序公文编号：
//! - `resolver`：按监督日期与创建顺序计算两个序数；
//! - `formatter`：按固定模板渲染编号字符串；
//! - `recalculation`：基于完整集合重算全部编号，幂等且与插入顺序无关。
//!
//! 引擎是纯函数，不做 I/O，也不保存计数器。
//!
mod formatter;
mod recalculation;
mod request;
mod resolver;

pub use formatter::{
    ADMINISTRATIVE_CODES, MAX_BASE_SEQUENCE, format_number, format_position, to_roman,
};
pub use recalculation::{
    assign_numbers, compute_number_for_new_request, recalculate_all, recalculate_in_place,
};
pub use request::{NewNumberingRequest, NumberingRequest, NumberingRequestBuilder, RequestId};
pub use resolver::{SequenceIndex, SequencePosition, resolve};
