//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值与校验逻辑。
//!

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// 值对象抽象
pub trait ValueObject {
    /// 业务校验失败时的错误类型
    type Error;

    /// 创建值对象时进行验证
    fn validate(&self) -> Result<(), Self::Error>;
}

/// 监督日期（分组键，无时间部分）
///
/// 编号模板固定使用 4 位年份，因此仅接受 1000..=9999 年。
///
/// # 示例
///
/// ```
/// use registry_domain::value_object::SupervisionDate;
///
/// let d: SupervisionDate = "2025-10-20".parse().unwrap();
/// assert_eq!(d.day(), 20);
/// assert_eq!(d.month(), 10);
/// assert_eq!(d.year(), 2025);
/// assert_eq!(d.to_string(), "2025-10-20");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "NaiveDate", into = "NaiveDate")]
pub struct SupervisionDate(NaiveDate);

impl SupervisionDate {
    pub const MIN_YEAR: i32 = 1000;
    pub const MAX_YEAR: i32 = 9999;

    /// 从 `NaiveDate` 创建（校验年份范围）
    pub fn new(date: NaiveDate) -> DomainResult<Self> {
        let value = Self(date);
        value.validate()?;
        Ok(value)
    }

    /// 从年/月/日创建
    ///
    /// ```
    /// use registry_domain::value_object::SupervisionDate;
    ///
    /// assert!(SupervisionDate::from_ymd(2025, 2, 30).is_err());
    /// assert!(SupervisionDate::from_ymd(2025, 2, 28).is_ok());
    /// ```
    pub fn from_ymd(year: i32, month: u32, day: u32) -> DomainResult<Self> {
        let date =
            NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| DomainError::InvalidDate {
                reason: format!("{year:04}-{month:02}-{day:02} is not a calendar date"),
            })?;
        Self::new(date)
    }

    pub const fn value(&self) -> NaiveDate {
        self.0
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }
}

impl ValueObject for SupervisionDate {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        let year = self.0.year();
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(DomainError::InvalidDate {
                reason: format!("year {year} does not have exactly four digits"),
            });
        }
        Ok(())
    }
}

impl fmt::Display for SupervisionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for SupervisionDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?;
        Self::new(date)
    }
}

impl TryFrom<NaiveDate> for SupervisionDate {
    type Error = DomainError;

    fn try_from(value: NaiveDate) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SupervisionDate> for NaiveDate {
    fn from(value: SupervisionDate) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 测试字符串解析
    #[test]
    fn test_parse_iso_date() {
        let d: SupervisionDate = "2025-10-20".parse().unwrap();
        assert_eq!(d.value(), NaiveDate::from_ymd_opt(2025, 10, 20).unwrap());
    }

    // 测试非法字符串
    #[test]
    fn test_parse_rejects_garbage() {
        for raw in ["", "20-10-2025", "2025/10/20", "2025-02-30", "tomorrow"] {
            let err = raw.parse::<SupervisionDate>().unwrap_err();
            assert!(
                matches!(err, DomainError::InvalidDate { .. }),
                "{raw:?} -> {err:?}"
            );
        }
    }

    // 测试年份必须为 4 位
    #[test]
    fn test_year_must_have_four_digits() {
        assert!(SupervisionDate::from_ymd(999, 1, 1).is_err());
        assert!(SupervisionDate::from_ymd(10000, 1, 1).is_err());
        assert!(SupervisionDate::from_ymd(1000, 1, 1).is_ok());
        assert!(SupervisionDate::from_ymd(9999, 12, 31).is_ok());
    }

    // 测试按时间顺序比较
    #[test]
    fn test_chronological_ordering() {
        let early = SupervisionDate::from_ymd(2025, 10, 15).unwrap();
        let late = SupervisionDate::from_ymd(2025, 10, 20).unwrap();
        let next_year = SupervisionDate::from_ymd(2026, 1, 1).unwrap();
        assert!(early < late);
        assert!(late < next_year);
    }

    // 测试序列化和反序列化
    #[test]
    fn test_serde_uses_iso_string() {
        let d = SupervisionDate::from_ymd(2025, 3, 7).unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "\"2025-03-07\"");

        let back: SupervisionDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);

        assert!(serde_json::from_str::<SupervisionDate>("\"0999-01-01\"").is_err());
    }
}
