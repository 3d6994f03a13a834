//! 登记簿配置
//!
//! 可通过 builder 构造，也可从 JSON 加载；缺省字段使用默认值。
//!
use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

fn default_page_sizes() -> Vec<usize> {
    vec![10, 20, 30, 40, 50]
}

/// 编号服务配置
///
/// ```
/// use registry_application::config::RegistryConfig;
///
/// let cfg = RegistryConfig::from_json_str(r#"{ "freeze_on_issue": true }"#).unwrap();
/// assert!(cfg.freeze_on_issue);
/// assert_eq!(cfg.default_page_size, 10);
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// 签发后立即冻结编号（之后的补录/撤回不再改变该编号）
    #[builder(default)]
    pub freeze_on_issue: bool,
    /// 历史列表允许的分页大小
    #[builder(default = default_page_sizes())]
    pub page_sizes: Vec<usize>,
    /// 未指定时使用的分页大小
    #[builder(default = 10)]
    pub default_page_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RegistryConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        let config: Self = serde_json::from_str(raw).map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.page_sizes.is_empty() || self.page_sizes.contains(&0) {
            return Err(AppError::Config(
                "page_sizes must be non-empty and positive".to_string(),
            ));
        }
        if !self.page_sizes.contains(&self.default_page_size) {
            return Err(AppError::Config(format!(
                "default_page_size {} is not one of {:?}",
                self.default_page_size, self.page_sizes
            )));
        }
        Ok(())
    }

    /// 解析请求的分页大小
    pub fn page_size(&self, requested: Option<usize>) -> Result<usize, AppError> {
        match requested {
            None => Ok(self.default_page_size),
            Some(size) if self.page_sizes.contains(&size) => Ok(size),
            Some(size) => Err(AppError::Validation(format!(
                "page size {size} is not one of {:?}",
                self.page_sizes
            ))),
        }
    }
}
