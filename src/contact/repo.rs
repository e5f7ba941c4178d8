use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::dto::{ContactMessage, NewContactMessage};

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn create(&self, msg: NewContactMessage) -> anyhow::Result<ContactMessage>;
    /// Newest first.
    async fn list(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<ContactMessage>>;
}

#[derive(Clone)]
pub struct PgContactStore {
    db: PgPool,
}

impl PgContactStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn create(&self, msg: NewContactMessage) -> anyhow::Result<ContactMessage> {
        let row = sqlx::query_as::<_, ContactMessage>(
            r#"
            INSERT INTO contact_messages (id, name, email, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, message, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&msg.name)
        .bind(&msg.email)
        .bind(&msg.message)
        .fetch_one(&self.db)
        .await
        .context("insert contact message")?;
        Ok(row)
    }

    async fn list(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<ContactMessage>> {
        let rows = sqlx::query_as::<_, ContactMessage>(
            r#"
            SELECT id, name, email, message, created_at
            FROM contact_messages
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list contact messages")?;
        Ok(rows)
    }
}

#[derive(Default)]
pub struct InMemoryContactStore {
    messages: RwLock<Vec<ContactMessage>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn create(&self, msg: NewContactMessage) -> anyhow::Result<ContactMessage> {
        let stored = ContactMessage {
            id: Uuid::new_v4(),
            name: msg.name,
            email: msg.email,
            message: msg.message,
            created_at: OffsetDateTime::now_utc(),
        };
        self.messages.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<ContactMessage>> {
        let messages = self.messages.read().await;
        Ok(messages
            .iter()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
