use crate::errors::TaskError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// タスクの識別子（ULID 文字列）
///
/// 外部からは不透明な値として扱い、生成はストアのみが行う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 永続化されるタスク
///
/// API のレスポンスとストアの読み書きで同じ形を共有する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// 入力を検証して新しいタスクを組み立てる（未保存）
    pub fn create(input: NewTask, now: DateTime<Utc>) -> Result<Self, TaskError> {
        let title = match input.title {
            Some(title) if !title.trim().is_empty() => title,
            _ => return Err(TaskError::validation("title is required")),
        };

        Ok(Self {
            id: TaskId::new(),
            title,
            description: input.description,
            completed: false,
            created_at: now,
        })
    }

    /// 指定されたフィールドだけを上書きする
    ///
    /// `id` と `created_at` は変更されない。
    pub fn apply(&mut self, patch: &TaskPatch) -> Result<(), TaskError> {
        patch.validate()?;

        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        Ok(())
    }
}

/// POST /tasks の入力
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// PUT /tasks/{id} の入力（部分更新）
///
/// 未知のフィールド（`_id` や `createdAt` を含む）は無視する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), TaskError> {
        match &self.title {
            Some(title) if title.trim().is_empty() => {
                Err(TaskError::validation("title must not be empty"))
            }
            _ => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

/// 作成日時の降順（新しい順）に並べ替える
///
/// 安定ソートなので、同時刻のタスクは渡された順序を保つ。
pub fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
