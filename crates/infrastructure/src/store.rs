use crate::connection::ConnectionState;
use async_trait::async_trait;
use domain::{NewTask, Task, TaskError, TaskId, TaskPatch};

/// タスクの永続化を抽象化するトレイト
///
/// 起動時に一度だけ生成し、ルータへ注入する。
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// 全件を作成日時の降順で返す
    async fn list_all(&self) -> Result<Vec<Task>, TaskError>;

    async fn create(&self, input: NewTask) -> Result<Task, TaskError>;

    /// 指定フィールドを上書きし、更新後のタスクを返す
    async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<Task, TaskError>;

    /// 存在しない ID の削除も成功として扱う
    async fn delete(&self, id: &TaskId) -> Result<(), TaskError>;

    fn connection_state(&self) -> ConnectionState;

    fn database_name(&self) -> &str;
}

/// 接続が確立していなければ `StoreUnavailable` を返す
pub fn ensure_ready(state: ConnectionState) -> Result<(), TaskError> {
    if state.is_ready() {
        Ok(())
    } else {
        Err(TaskError::StoreUnavailable(format!(
            "connection is {state}"
        )))
    }
}
