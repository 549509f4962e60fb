use crate::connection::{ConnectionState, ConnectionTracker};
use crate::models::{
    item_to_task, task_key, task_to_item, COMPLETED_ATTR, DESCRIPTION_ATTR, ID_ATTR, TITLE_ATTR,
};
use crate::store::{ensure_ready, TaskStore};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use chrono::Utc;
use domain::{sort_newest_first, NewTask, Task, TaskError, TaskId, TaskPatch};
use shared::{ConnectionString, CredentialSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// 1 回の操作（接続確認を含む）に許す時間
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// DynamoDB をドキュメントストアとして使うタスクストア
pub struct DynamoTaskStore {
    client: Client,
    table_name: String,
    state: ConnectionTracker,
}

impl DynamoTaskStore {
    /// 接続文字列からクライアントを構築する（まだ接続確認はしない）
    pub async fn new(connection: &ConnectionString) -> Self {
        Self::with_operation_timeout(connection, DEFAULT_OPERATION_TIMEOUT).await
    }

    /// SDK のリトライは無効にし、失敗は最初の 1 回で呼び出し元へ返す
    pub async fn with_operation_timeout(connection: &ConnectionString, timeout: Duration) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(connection.region.clone()))
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .connect_timeout(timeout)
                    .operation_timeout(timeout)
                    .build(),
            );

        if let CredentialSource::Static {
            access_key_id,
            secret_access_key,
        } = &connection.credentials
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id.clone(),
                secret_access_key.clone(),
                None,
                None,
                "connection-string",
            ));
        }

        if let Some(endpoint) = &connection.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }

        let sdk_config = loader.load().await;
        Self::from_client(Client::new(&sdk_config), &connection.database)
    }

    pub fn from_client(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            state: ConnectionTracker::default(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// テーブルの存在を確認して接続状態を確定する
    ///
    /// 失敗してもプロセスは止めず、状態は `disconnected` のまま残す。
    pub async fn connect(&self) -> Result<(), TaskError> {
        self.state.set(ConnectionState::Connecting);

        match self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
        {
            Ok(_) => {
                self.state.set(ConnectionState::Connected);
                info!(database = %self.table_name, "Connected to document store");
                Ok(())
            }
            Err(e) => {
                self.state.set(ConnectionState::Disconnected);
                let message = DisplayErrorContext(&e).to_string();
                error!(database = %self.table_name, error = %message, "Document store connection error");
                Err(TaskError::StoreUnavailable(message))
            }
        }
    }

    pub fn disconnect(&self) {
        self.state.set(ConnectionState::Disconnecting);
        self.state.set(ConnectionState::Disconnected);
    }

    /// 切断中であれば一定間隔で再接続を試みる
    ///
    /// リクエスト単位のリトライは行わない。復旧はこの監視タスクのみが担う。
    pub fn spawn_reconnect_monitor(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if self.state.get() == ConnectionState::Disconnected {
                    debug!(database = %self.table_name, "Retrying document store connection");
                    let _ = self.connect().await;
                }
            }
        })
    }

    /// 通信レベルの失敗を接続断として記録する
    fn observe<T, E>(&self, result: Result<T, SdkError<E>>) -> Result<T, SdkError<E>> {
        match &result {
            Ok(_) => self.state.set(ConnectionState::Connected),
            Err(SdkError::DispatchFailure(_) | SdkError::TimeoutError(_)) => {
                self.state.set(ConnectionState::Disconnected)
            }
            Err(_) => {}
        }
        result
    }

    async fn get_task(&self, id: &TaskId) -> Result<Task, TaskError> {
        let (key, value) = task_key(id);
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(key, value)
            .consistent_read(true)
            .send()
            .await;
        let output = self.observe(result).map_err(store_error)?;

        let item = output
            .item()
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        item_to_task(item)
    }
}

#[async_trait]
impl TaskStore for DynamoTaskStore {
    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn list_all(&self) -> Result<Vec<Task>, TaskError> {
        ensure_ready(self.state.get())?;

        let mut tasks = Vec::new();
        let mut start_key = None;
        loop {
            let result = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key)
                .send()
                .await;
            let output = self.observe(result).map_err(store_error)?;

            for item in output.items() {
                tasks.push(item_to_task(item)?);
            }

            match output.last_evaluated_key() {
                Some(key) => start_key = Some(key.clone()),
                None => break,
            }
        }

        // スキャン順は不定なので ID で並べてから作成日時で安定ソート
        tasks.sort_by(|a, b| b.id.as_str().cmp(a.id.as_str()));
        sort_newest_first(&mut tasks);

        info!(count = tasks.len(), "Retrieved tasks");
        Ok(tasks)
    }

    #[instrument(skip(self, input), fields(table = %self.table_name))]
    async fn create(&self, input: NewTask) -> Result<Task, TaskError> {
        ensure_ready(self.state.get())?;

        let task = Task::create(input, Utc::now())?;

        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(task_to_item(&task)))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", ID_ATTR)
            .send()
            .await;
        self.observe(result).map_err(store_error)?;

        info!(task_id = %task.id, "Task created");
        Ok(task)
    }

    #[instrument(skip(self, patch), fields(table = %self.table_name))]
    async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<Task, TaskError> {
        ensure_ready(self.state.get())?;
        patch.validate()?;

        if patch.is_empty() {
            return self.get_task(id).await;
        }

        let (key, value) = task_key(id);
        let mut set_parts = Vec::new();
        let mut builder = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(key, value)
            .condition_expression("attribute_exists(#id)")
            .expression_attribute_names("#id", ID_ATTR)
            .return_values(ReturnValue::AllNew);

        if let Some(title) = patch.title {
            set_parts.push("#title = :title");
            builder = builder
                .expression_attribute_names("#title", TITLE_ATTR)
                .expression_attribute_values(":title", AttributeValue::S(title));
        }

        if let Some(description) = patch.description {
            set_parts.push("#description = :description");
            builder = builder
                .expression_attribute_names("#description", DESCRIPTION_ATTR)
                .expression_attribute_values(":description", AttributeValue::S(description));
        }

        if let Some(completed) = patch.completed {
            set_parts.push("#completed = :completed");
            builder = builder
                .expression_attribute_names("#completed", COMPLETED_ATTR)
                .expression_attribute_values(":completed", AttributeValue::Bool(completed));
        }

        let result = builder
            .update_expression(format!("SET {}", set_parts.join(", ")))
            .send()
            .await;

        let output = match self.observe(result) {
            Ok(output) => output,
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                return Err(TaskError::NotFound(id.to_string()));
            }
            Err(e) => return Err(store_error(e)),
        };

        let item = output
            .attributes()
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        let task = item_to_task(item)?;

        info!(task_id = %task.id, completed = task.completed, "Task updated");
        Ok(task)
    }

    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn delete(&self, id: &TaskId) -> Result<(), TaskError> {
        ensure_ready(self.state.get())?;

        let (key, value) = task_key(id);
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(key, value)
            .send()
            .await;
        self.observe(result).map_err(store_error)?;

        info!(task_id = %id, "Task deleted");
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    fn database_name(&self) -> &str {
        &self.table_name
    }
}

fn store_error<E>(e: SdkError<E>) -> TaskError
where
    E: std::error::Error + 'static,
{
    let message = DisplayErrorContext(&e).to_string();
    match e {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            TaskError::StoreUnavailable(message)
        }
        _ => TaskError::Store(message),
    }
}
