use crate::connection::{ConnectionState, ConnectionTracker};
use crate::store::{ensure_ready, TaskStore};
use async_trait::async_trait;
use chrono::Utc;
use domain::{sort_newest_first, NewTask, Task, TaskError, TaskId, TaskPatch};
use std::sync::{Mutex, MutexGuard};

/// InMemory 実装（開発/テスト用）
///
/// 接続状態を外から切り替えられるので、ストア停止時の挙動も検証できる。
#[derive(Debug)]
pub struct InMemoryTaskStore {
    // 挿入順で保持
    tasks: Mutex<Vec<Task>>,
    state: ConnectionTracker,
    name: String,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::with_state(ConnectionState::Connected)
    }

    pub fn with_state(state: ConnectionState) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            state: ConnectionTracker::new(state),
            name: "memory".to_string(),
        }
    }

    pub fn set_state(&self, state: ConnectionState) {
        self.state.set(state);
    }

    /// 接続状態を無視して保持件数を返す（テスト観測用）
    pub fn len(&self) -> Result<usize, TaskError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, TaskError> {
        Ok(self.len()? == 0)
    }

    fn tasks(&self) -> Result<MutexGuard<'_, Vec<Task>>, TaskError> {
        ensure_ready(self.state.get())?;
        self.lock()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Task>>, TaskError> {
        self.tasks
            .lock()
            .map_err(|_| TaskError::Store("task list lock poisoned".to_string()))
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list_all(&self) -> Result<Vec<Task>, TaskError> {
        // 新しい順に並べてから安定ソートし、同時刻は後から作ったものを先頭にする
        let mut tasks: Vec<Task> = self.tasks()?.iter().rev().cloned().collect();
        sort_newest_first(&mut tasks);
        Ok(tasks)
    }

    async fn create(&self, input: NewTask) -> Result<Task, TaskError> {
        let mut tasks = self.tasks()?;
        let task = Task::create(input, Utc::now())?;
        tasks.push(task.clone());
        Ok(task)
    }

    async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<Task, TaskError> {
        let mut tasks = self.tasks()?;
        let task = tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        task.apply(&patch)?;
        Ok(task.clone())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), TaskError> {
        self.tasks()?.retain(|task| &task.id != id);
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    fn database_name(&self) -> &str {
        &self.name
    }
}
