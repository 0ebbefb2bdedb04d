//! # 数据模型模块
//!
//! 定义了与前端 JSON 接口一一对应的 Rust 数据结构。
//! - `project` - 项目和会话摘要
//! - `message` - 会话消息和工具调用
//! - `settings` - AI 服务配置和查看器运行设置
//! - `stats` - 统计快照
//! - `report` - 分析报告元数据

pub mod message;
pub mod project;
pub mod report;
pub mod settings;
pub mod stats;
