//! 实体（Entity）基础抽象
//!
//! 为登记簿中的实体提供统一的标识（Id）能力。
//!
use std::{fmt::Display, str::FromStr};

/// 具备唯一标识的实体抽象
pub trait Entity: Send + Sync {
    /// 实体标识类型，要求可解析、可显示、可克隆且全序（用于确定性排序）
    type Id: FromStr + Clone + Display + Ord;

    /// 获取实体标识
    fn id(&self) -> &Self::Id;
}
