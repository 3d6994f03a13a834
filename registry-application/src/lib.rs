//! 公文登记簿应用层（registry-application）
//!
//! 在纯领域编号引擎之上提供：
//! - 命令/查询总线（`InMemoryCommandBus` / `InMemoryQueryBus`）；
//! - `NumberingService`：串行化取号、改期、撤回、冻结与整体重算；
//! - 仓储端口 `NumberingRepository` 及进程内实现；
//! - `RegistryConfig` 配置。
//!
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod config;
pub mod context;
pub mod dto;
pub mod error;
pub mod inmemory_command_bus;
pub mod inmemory_query_bus;
pub mod numbering;
pub mod query;
pub mod query_bus;
pub mod query_handler;
pub mod repository;

pub use inmemory_command_bus::InMemoryCommandBus;
pub use inmemory_query_bus::InMemoryQueryBus;
