//! # 业务逻辑服务模块
//!
//! 包含核心业务逻辑的实现，与 HTTP 层解耦：
//! - `scanner` - Claude Code 数据目录扫描，所有读取都经过这一层
//! - `parser` - JSONL 文件的容错解析
//! - `transformer` - 将原始记录转换为可渲染的消息
//! - `session_store` - 项目和会话的列表、读取、删除
//! - `aggregator` - 全量统计聚合
//! - `transcript` - 按字符预算构建转录文本
//! - `provider` - AI 服务调用抽象及 OpenAI 兼容实现
//! - `analysis` - 偏好分析编排
//! - `report_store` / `config_store` - 报告和 AI 服务配置的持久化

pub mod aggregator;
pub mod analysis;
pub mod config_store;
pub mod parser;
pub mod provider;
pub mod report_store;
pub mod scanner;
pub mod session_store;
pub mod transcript;
pub mod transformer;
