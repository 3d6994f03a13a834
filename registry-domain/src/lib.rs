//! 公文登记簿领域层（registry-domain）
//!
//! 核心是监督编号引擎：为每个编号请求分配形如
//! `001.1/LHP/PM.00.02/JI-24/20/X/2025` 的顺序编号，
//! 并在请求新增、改期、撤回或补录时保持整个集合的编号一致。
//!
//! 典型用法：
//! 1. 调用方为新请求分配 `id` 与 `created_at`；
//! 2. 通过 `numbering::compute_number_for_new_request` 基于插入后的集合计算编号；
//! 3. 需要整体修复时调用 `numbering::recalculate_all`。
//!
pub mod entity;
pub mod error;
pub mod numbering;
pub mod specification;
pub mod value_object;
