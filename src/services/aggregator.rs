//! # 统计聚合服务
//!
//! 对所有项目的所有会话做一次完整扫描，生成 `Statistics` 快照。
//! 不维护增量索引，也不缓存结果：每次调用都从磁盘重新计算，
//! 因此结果总是与调用时刻的磁盘状态一致。

use std::collections::BTreeMap;

use crate::error::AppError;
use crate::models::message::Message;
use crate::models::stats::{ProjectActivity, Statistics};
use crate::services::scanner::Scanner;
use crate::utils::path::decode_project_path;
use crate::utils::time::activity_bucket;

/// 项目活跃度排名保留的项目数
pub const TOP_PROJECTS: usize = 10;

/// 扫描全部会话并计算统计快照
///
/// 单个会话文件在扫描过程中被删除时跳过该会话（视为 0 条消息），
/// 与并发删除的"尽力一致"语义相符。
pub async fn compute(scanner: &Scanner) -> Result<Statistics, AppError> {
    let mut acc = Accumulator::new();

    let project_ids = scanner.project_ids().await?;
    acc.stats.total_projects = project_ids.len() as u64;

    // 会话引用基于同一份项目列表，总数与排名不会因并发增删目录而不一致
    let refs = scanner.sessions_of(&project_ids).await?;
    acc.stats.total_sessions = refs.len() as u64;

    // 项目按目录名顺序登记，排名时的稳定排序以此为原始顺序
    let mut per_project: Vec<(String, u64)> =
        project_ids.iter().map(|id| (id.clone(), 0)).collect();

    for session in &refs {
        let what = format!("会话 {}/{}", session.project_id, session.session_id);
        let messages = match scanner.read_session_file(&session.path, &what).await {
            Ok(messages) => messages,
            Err(AppError::NotFound(_)) => {
                log::info!("{} 在统计过程中被删除，已跳过", what);
                continue;
            }
            Err(e) => return Err(e),
        };

        for message in &messages {
            acc.add(message);
        }
        if let Some(entry) = per_project
            .iter_mut()
            .find(|(id, _)| *id == session.project_id)
        {
            entry.1 += messages.len() as u64;
        }
    }

    acc.stats.total_history_entries = scanner.read_history().await?.len() as u64;
    acc.stats.projects_by_activity = rank_projects(per_project);
    Ok(acc.stats)
}

/// 按消息数降序排名，保留前 `TOP_PROJECTS` 个
///
/// `sort_by` 是稳定排序，消息数相同的项目保持传入顺序。
fn rank_projects(per_project: Vec<(String, u64)>) -> Vec<ProjectActivity> {
    let mut ranked: Vec<ProjectActivity> = per_project
        .into_iter()
        .map(|(id, messages)| ProjectActivity {
            name: decode_project_path(&id),
            id,
            messages,
        })
        .collect();
    ranked.sort_by(|a, b| b.messages.cmp(&a.messages));
    ranked.truncate(TOP_PROJECTS);
    ranked
}

/// 单遍累加器
struct Accumulator {
    stats: Statistics,
}

impl Accumulator {
    fn new() -> Self {
        let mut stats = Statistics::default();
        stats.hourly_activity = (0..24u8).map(|h| (h, 0)).collect::<BTreeMap<_, _>>();
        Self { stats }
    }

    fn add(&mut self, message: &Message) {
        let stats = &mut self.stats;
        stats.total_messages += 1;

        match message.timestamp.as_ref().and_then(activity_bucket) {
            Some((day, hour)) => {
                *stats.daily_activity.entry(day).or_default() += 1;
                *stats.hourly_activity.entry(hour).or_default() += 1;
            }
            None => stats.undated_messages += 1,
        }

        if !message.model.is_empty() {
            *stats.model_usage.entry(message.model.clone()).or_default() += 1;
        }

        for tool in &message.tool_uses {
            if let Some(name) = &tool.name {
                *stats.tool_usage.entry(name.clone()).or_default() += 1;
            }
        }
    }
}
