//! # 通用工具模块
//!
//! - `path` - 数据目录定位、项目目录名解码、URL 名称校验
//! - `time` - 无依赖的时间格式化与统计桶提取

pub mod path;
pub mod time;
