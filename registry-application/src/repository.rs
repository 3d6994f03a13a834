//! 编号请求仓储端口
//!
//! 存储引擎不在本库范围内，这里只定义接口与一个进程内实现。
//! 写入须经由 `NumberingService`，由其串行化“追加 → 解析 → 格式化 → 持久化”。
//!
use async_trait::async_trait;
use dashmap::DashMap;
use registry_domain::entity::Entity;
use registry_domain::numbering::{NumberingRequest, RequestId};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::AppError;

#[async_trait]
pub trait NumberingRepository: Send + Sync {
    /// 读取完整集合（顺序不作保证）
    async fn load_all(&self) -> Result<Vec<NumberingRequest>, AppError>;

    /// 以给定集合整体替换已存储的集合
    async fn replace_all(&self, requests: Vec<NumberingRequest>) -> Result<(), AppError>;
}

#[async_trait]
impl<T> NumberingRepository for Arc<T>
where
    T: NumberingRepository + ?Sized,
{
    async fn load_all(&self) -> Result<Vec<NumberingRequest>, AppError> {
        (**self).load_all().await
    }

    async fn replace_all(&self, requests: Vec<NumberingRequest>) -> Result<(), AppError> {
        (**self).replace_all(requests).await
    }
}

/// 基于内存的仓储实现
#[derive(Default)]
pub struct InMemoryNumberingRepository {
    requests: DashMap<RequestId, NumberingRequest>,
}

impl InMemoryNumberingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[async_trait]
impl NumberingRepository for InMemoryNumberingRepository {
    async fn load_all(&self) -> Result<Vec<NumberingRequest>, AppError> {
        Ok(self.requests.iter().map(|e| e.value().clone()).collect())
    }

    async fn replace_all(&self, requests: Vec<NumberingRequest>) -> Result<(), AppError> {
        let keep: HashSet<RequestId> = requests.iter().map(|r| *r.id()).collect();
        self.requests.retain(|id, _| keep.contains(id));
        for request in requests {
            self.requests.insert(*request.id(), request);
        }
        Ok(())
    }
}
