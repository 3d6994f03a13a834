//! 编号格式化器（Number Formatter）
//!
//! 模板：`{seq}{suffix}/LHP/PM.00.02/JI-24/{day}/{monthRoman}/{year}`。
//! 该字符串是对外的公文编号，必须逐字节保持。
//!
use crate::error::{DomainError, DomainResult};
use crate::numbering::resolver::SequencePosition;
use crate::value_object::SupervisionDate;

/// 固定的行政代码段
pub const ADMINISTRATIVE_CODES: &str = "LHP/PM.00.02/JI-24";

/// 三位序号字段能表示的最大日期序号
pub const MAX_BASE_SEQUENCE: u32 = 999;

const ROMAN_MONTHS: [&str; 12] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
];

/// 月份（1..=12）转大写罗马数字
///
/// ```
/// use registry_domain::numbering::to_roman;
///
/// assert_eq!(to_roman(10).unwrap(), "X");
/// assert!(to_roman(13).is_err());
/// ```
pub fn to_roman(month: u32) -> DomainResult<&'static str> {
    month
        .checked_sub(1)
        .and_then(|i| ROMAN_MONTHS.get(i as usize))
        .copied()
        .ok_or(DomainError::InvalidMonth { month })
}

/// 由两个序数与监督日期渲染最终编号
///
/// ```
/// use registry_domain::numbering::format_number;
/// use registry_domain::value_object::SupervisionDate;
///
/// let date = SupervisionDate::from_ymd(2025, 10, 20).unwrap();
/// assert_eq!(
///     format_number(1, 0, date).unwrap(),
///     "001/LHP/PM.00.02/JI-24/20/X/2025"
/// );
/// ```
pub fn format_number(
    base_sequence: u32,
    tie_break_index: u32,
    supervision_date: SupervisionDate,
) -> DomainResult<String> {
    if base_sequence == 0 || base_sequence > MAX_BASE_SEQUENCE {
        return Err(DomainError::OutOfRange { base_sequence });
    }
    let month = to_roman(supervision_date.month())?;
    let suffix = match tie_break_index {
        0 => String::new(),
        n => format!(".{n}"),
    };

    Ok(format!(
        "{base_sequence:03}{suffix}/{ADMINISTRATIVE_CODES}/{day:02}/{month}/{year:04}",
        day = supervision_date.day(),
        year = supervision_date.year(),
    ))
}

pub fn format_position(
    position: SequencePosition,
    supervision_date: SupervisionDate,
) -> DomainResult<String> {
    format_number(
        position.base_sequence,
        position.tie_break_index,
        supervision_date,
    )
}
