//! # 分析报告存储
//!
//! 每份报告是 `<data_dir>/reports/` 下的一个 Markdown 文件，写入后只读，只能整体删除。
//! 新报告以 create-new 方式创建，文件名冲突时追加 `-2`、`-3` 等后缀，
//! 不会覆盖已有报告。

use std::path::PathBuf;
use std::time::SystemTime;

use tokio::io::AsyncWriteExt;

use crate::error::AppError;
use crate::models::report::{ReportContent, ReportInfo};
use crate::utils::path::is_safe_component;
use crate::utils::time::system_time_to_iso8601;

/// 报告文件扩展名
const REPORT_EXTENSION: &str = "md";

/// 同名冲突时尝试的最大后缀编号
const MAX_NAME_ATTEMPTS: usize = 100;

#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 列出所有报告，最新的在前（修改时间相同按文件名排序）
    pub async fn list(&self) -> Result<Vec<ReportInfo>, AppError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut reports = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => metadata,
                _ => continue,
            };
            reports.push(ReportInfo {
                filename: entry.file_name().to_string_lossy().to_string(),
                size: metadata.len(),
                created_at: system_time_to_iso8601(
                    metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                ),
            });
        }

        reports.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.filename.cmp(&b.filename))
        });
        Ok(reports)
    }

    /// 读取报告全文
    pub async fn read(&self, filename: &str) -> Result<ReportContent, AppError> {
        let path = self.resolve(filename)?;
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::from_io(e, format!("报告 {filename}")))?;
        Ok(ReportContent {
            filename: filename.to_string(),
            content,
        })
    }

    /// 删除报告
    ///
    /// # 错误
    /// 报告不存在时返回 `NotFound`
    pub async fn delete(&self, filename: &str) -> Result<(), AppError> {
        let path = self.resolve(filename)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| AppError::from_io(e, format!("报告 {filename}")))?;
        log::info!("已删除报告 {}", filename);
        Ok(())
    }

    /// 以 `<stem>.md` 为名创建新报告，冲突时追加后缀
    ///
    /// 写入失败时删除已创建的文件，不留下半份报告。
    pub async fn create(&self, stem: &str, content: &str) -> Result<ReportInfo, AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let filename = if attempt == 1 {
                format!("{stem}.{REPORT_EXTENSION}")
            } else {
                format!("{stem}-{attempt}.{REPORT_EXTENSION}")
            };
            let path = self.dir.join(&filename);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(AppError::Io(e)),
            };

            let written = async {
                file.write_all(content.as_bytes()).await?;
                file.flush().await
            }
            .await;
            if let Err(e) = written {
                drop(file);
                tokio::fs::remove_file(&path).await.ok();
                return Err(AppError::Io(e));
            }

            log::info!("已写入分析报告 {}", filename);
            return Ok(ReportInfo {
                filename,
                size: content.len() as u64,
                created_at: system_time_to_iso8601(SystemTime::now()),
            });
        }

        Err(AppError::Internal(format!(
            "报告文件名 {stem} 冲突次数过多"
        )))
    }

    /// 校验报告文件名并拼接为完整路径
    fn resolve(&self, filename: &str) -> Result<PathBuf, AppError> {
        if !is_safe_component(filename) {
            return Err(AppError::Validation(format!("非法的报告文件名: {filename}")));
        }
        Ok(self.dir.join(filename))
    }
}
