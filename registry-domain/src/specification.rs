//! 规约（Specification）
//!
//! 封装登记簿上的业务判定，使其可复用、可组合和可测试。
//!
use crate::numbering::NumberingRequest;

/// 规约模式的核心 trait
pub trait Specification<T> {
    /// 检查候选对象是否满足规约
    fn is_satisfied_by(&self, candidate: &T) -> bool;

    /// 对规约进行 NOT 操作
    fn not(self) -> NotSpecification<Self>
    where
        Self: Sized,
    {
        NotSpecification { inner: self }
    }
}

/// NOT 规约：内部规约不满足时才满足
pub struct NotSpecification<S> {
    inner: S,
}

impl<T, S> Specification<T> for NotSpecification<S>
where
    S: Specification<T>,
{
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        !self.inner.is_satisfied_by(candidate)
    }
}

/// 已冻结且已持有编号的请求：编号不再重算
pub struct IsFrozen;

impl Specification<NumberingRequest> for IsFrozen {
    fn is_satisfied_by(&self, candidate: &NumberingRequest) -> bool {
        candidate.is_frozen() && candidate.generated_number().is_some()
    }
}

/// 已分配编号的请求
pub struct IsNumbered;

impl Specification<NumberingRequest> for IsNumbered {
    fn is_satisfied_by(&self, candidate: &NumberingRequest) -> bool {
        candidate.generated_number().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_object::SupervisionDate;

    fn request() -> NumberingRequest {
        NumberingRequest::builder()
            .supervision_date(SupervisionDate::from_ymd(2025, 10, 20).unwrap())
            .build()
    }

    #[test]
    fn test_is_numbered() {
        let mut r = request();
        assert!(!IsNumbered.is_satisfied_by(&r));
        r.assign_number("001/LHP/PM.00.02/JI-24/20/X/2025".to_string());
        assert!(IsNumbered.is_satisfied_by(&r));
    }

    #[test]
    fn test_frozen_requires_number() {
        let mut r = request();
        assert!(r.freeze().is_err());
        assert!(!IsFrozen.is_satisfied_by(&r));

        r.assign_number("001/LHP/PM.00.02/JI-24/20/X/2025".to_string());
        r.freeze().unwrap();
        assert!(IsFrozen.is_satisfied_by(&r));
        assert!(!IsFrozen.not().is_satisfied_by(&r));
    }
}
