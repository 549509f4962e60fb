use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use domain::{Task, TaskError, TaskId};
use std::collections::HashMap;

/// テーブルのパーティションキー
pub const ID_ATTR: &str = "id";
pub const TITLE_ATTR: &str = "title";
pub const DESCRIPTION_ATTR: &str = "description";
pub const COMPLETED_ATTR: &str = "completed";
pub const CREATED_AT_ATTR: &str = "created_at";

pub type Item = HashMap<String, AttributeValue>;

/// DynamoDB のキー（`id` 単独）
pub fn task_key(id: &TaskId) -> (String, AttributeValue) {
    (ID_ATTR.to_string(), AttributeValue::S(id.as_str().to_string()))
}

/// Task を DynamoDB アイテムに変換
pub fn task_to_item(task: &Task) -> Item {
    let mut item = HashMap::from([
        task_key(&task.id),
        (
            TITLE_ATTR.to_string(),
            AttributeValue::S(task.title.clone()),
        ),
        (
            COMPLETED_ATTR.to_string(),
            AttributeValue::Bool(task.completed),
        ),
        (
            CREATED_AT_ATTR.to_string(),
            AttributeValue::S(task.created_at.to_rfc3339()),
        ),
    ]);

    if let Some(description) = &task.description {
        item.insert(
            DESCRIPTION_ATTR.to_string(),
            AttributeValue::S(description.clone()),
        );
    }

    item
}

/// DynamoDB アイテムを Task に変換
///
/// 必須属性が欠けている・型が合わない場合は `TaskError::Store`。
pub fn item_to_task(item: &Item) -> Result<Task, TaskError> {
    parse_item(item).ok_or_else(|| {
        let id = item
            .get(ID_ATTR)
            .and_then(|v| v.as_s().ok())
            .map(String::as_str)
            .unwrap_or("<unknown>");
        TaskError::Store(format!("malformed task item: {id}"))
    })
}

fn parse_item(item: &Item) -> Option<Task> {
    let created_at = item.get(CREATED_AT_ATTR)?.as_s().ok()?;

    Some(Task {
        id: TaskId::from_string(item.get(ID_ATTR)?.as_s().ok()?.clone()),
        title: item.get(TITLE_ATTR)?.as_s().ok()?.clone(),
        description: match item.get(DESCRIPTION_ATTR) {
            Some(value) => Some(value.as_s().ok()?.clone()),
            None => None,
        },
        completed: item
            .get(COMPLETED_ATTR)
            .map(|v| v.as_bool().ok().copied())
            .unwrap_or(Some(false))?,
        created_at: DateTime::parse_from_rfc3339(created_at)
            .ok()?
            .with_timezone(&Utc),
    })
}
