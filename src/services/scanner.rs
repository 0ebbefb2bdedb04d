//! # 存储扫描服务
//!
//! 封装 Claude Code 数据目录的物理布局，其余模块只通过 `Scanner` 访问会话数据：
//!
//! ```text
//! <claude_dir>/
//! ├── history.jsonl
//! └── projects/
//!     └── <project_id>/
//!         └── <session_id>.jsonl
//! ```
//!
//! 所有操作只读。项目目录和会话文件按名称排序返回，保证迭代顺序稳定。
//! 将来替换为带索引的存储时，只需要替换这一层。

use std::path::{Path, PathBuf};

use tokio::task::JoinSet;

use crate::error::AppError;
use crate::models::message::{HistoryEntry, Message};
use crate::models::project::Project;
use crate::services::{parser, transformer};
use crate::utils::path::{decode_project_path, is_safe_component};

/// 会话文件扩展名
const SESSION_EXTENSION: &str = "jsonl";

/// 对一个会话文件的引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRef {
    pub project_id: String,
    pub session_id: String,
    pub path: PathBuf,
}

/// Claude Code 数据目录扫描器
#[derive(Debug, Clone)]
pub struct Scanner {
    projects_dir: PathBuf,
    history_file: PathBuf,
}

impl Scanner {
    pub fn new(claude_dir: &Path) -> Self {
        Self {
            projects_dir: claude_dir.join("projects"),
            history_file: claude_dir.join("history.jsonl"),
        }
    }

    /// 解析项目 ID 对应的目录路径（不检查是否存在）
    ///
    /// # 错误
    /// ID 不是合法的单段名称时返回 `NotFound`
    pub fn project_dir(&self, project_id: &str) -> Result<PathBuf, AppError> {
        if !is_safe_component(project_id) {
            return Err(AppError::NotFound(format!("项目 {project_id}")));
        }
        Ok(self.projects_dir.join(project_id))
    }

    /// 解析会话文件路径（不检查是否存在）
    pub fn session_file(&self, project_id: &str, session_id: &str) -> Result<PathBuf, AppError> {
        let project_dir = self.project_dir(project_id)?;
        if !is_safe_component(session_id) {
            return Err(AppError::NotFound(format!("会话 {project_id}/{session_id}")));
        }
        Ok(project_dir.join(format!("{session_id}.{SESSION_EXTENSION}")))
    }

    /// 确认项目目录存在并返回其路径
    pub async fn existing_project_dir(&self, project_id: &str) -> Result<PathBuf, AppError> {
        let dir = self.project_dir(project_id)?;
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(dir),
            Ok(_) => Err(AppError::NotFound(format!("项目 {project_id}"))),
            Err(e) => Err(AppError::from_io(e, format!("项目 {project_id}"))),
        }
    }

    /// 列出所有项目目录（按目录名排序）
    ///
    /// `projects/` 目录不存在时说明没有任何项目数据，返回空数组。
    pub async fn project_ids(&self) -> Result<Vec<String>, AppError> {
        let mut dir = match tokio::fs::read_dir(&self.projects_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut ids = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                ids.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// 扫描所有项目及其会话数量
    ///
    /// 各项目目录的会话计数使用 `JoinSet` 并行执行；
    /// 结果按会话数降序排列，数量相同时按目录名排序。
    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        let mut join_set = JoinSet::new();

        for (index, id) in self.project_ids().await?.into_iter().enumerate() {
            let dir = self.projects_dir.join(&id);
            join_set.spawn(async move {
                let session_count = match session_files_in(&dir).await {
                    Ok(files) => files.len(),
                    Err(e) => {
                        // 单个项目扫描失败不影响其他项目，仅记录日志
                        log::warn!("扫描项目 {} 失败: {}", id, e);
                        0
                    }
                };
                let project = Project {
                    name: decode_project_path(&id),
                    path: dir.to_string_lossy().to_string(),
                    id,
                    session_count,
                };
                (index, project)
            });
        }

        let mut indexed = Vec::new();
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok(item) => indexed.push(item),
                Err(e) => log::warn!("扫描项目任务失败: {}", e),
            }
        }

        indexed.sort_by_key(|(index, _)| *index);
        let mut projects: Vec<Project> = indexed.into_iter().map(|(_, p)| p).collect();
        projects.sort_by(|a, b| b.session_count.cmp(&a.session_count));
        Ok(projects)
    }

    /// 列出会话文件引用
    ///
    /// # 参数
    /// - `project_id` - 指定项目；`None` 表示所有项目
    ///
    /// # 返回值
    /// 先按项目目录名、再按会话文件名排序
    ///
    /// # 错误
    /// 指定的项目不存在时返回 `NotFound`
    pub async fn session_refs(&self, project_id: Option<&str>) -> Result<Vec<SessionRef>, AppError> {
        match project_id {
            Some(id) => {
                let dir = self.existing_project_dir(id).await?;
                let files = session_files_in(&dir).await?;
                Ok(files
                    .into_iter()
                    .map(|(session_id, path)| SessionRef {
                        project_id: id.to_string(),
                        session_id,
                        path,
                    })
                    .collect())
            }
            None => self.sessions_of(&self.project_ids().await?).await,
        }
    }

    /// 列出给定项目列表下的会话文件引用
    ///
    /// 调用方已持有项目列表时使用，保证与该列表一致，不再重新读取 `projects/`。
    /// 列表中的目录在读取前被删除时跳过该项目。
    pub async fn sessions_of(&self, project_ids: &[String]) -> Result<Vec<SessionRef>, AppError> {
        let mut refs = Vec::new();
        for id in project_ids {
            let Ok(dir) = self.project_dir(id) else {
                continue;
            };
            let files = match session_files_in(&dir).await {
                Ok(files) => files,
                Err(AppError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            refs.extend(files.into_iter().map(|(session_id, path)| SessionRef {
                project_id: id.clone(),
                session_id,
                path,
            }));
        }
        Ok(refs)
    }

    /// 读取会话的所有消息
    ///
    /// # 错误
    /// 项目或会话不存在时返回 `NotFound`
    pub async fn read_session(
        &self,
        project_id: &str,
        session_id: &str,
    ) -> Result<Vec<Message>, AppError> {
        self.existing_project_dir(project_id).await?;
        let file = self.session_file(project_id, session_id)?;
        self.read_session_file(&file, &format!("会话 {project_id}/{session_id}"))
            .await
    }

    /// 按路径读取会话消息，供批量扫描使用
    pub async fn read_session_file(&self, file: &Path, what: &str) -> Result<Vec<Message>, AppError> {
        let records = parser::read_records(file, what).await?;
        Ok(records.iter().filter_map(transformer::to_message).collect())
    }

    /// 读取 `history.jsonl` 的全部条目
    pub async fn read_history(&self) -> Result<Vec<HistoryEntry>, AppError> {
        parser::read_history(&self.history_file).await
    }
}

/// 列出目录下的 `.jsonl` 会话文件：(会话 ID, 路径)，按文件名排序
async fn session_files_in(dir: &Path) -> Result<Vec<(String, PathBuf)>, AppError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| AppError::from_io(e, format!("项目目录 {}", dir.display())))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SESSION_EXTENSION) {
            continue;
        }
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            files.push((stem.to_string(), path.clone()));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}
