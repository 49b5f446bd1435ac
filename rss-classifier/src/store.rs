use crate::traits::ArticleStore;
use crate::types::{ArticleRecord, InsertOutcome, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info, warn};

pub struct SqliteArticleStore {
    db: SqlitePool,
}

impl SqliteArticleStore {
    /// Connect and make sure the `articles` table exists.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to `:memory:` is a separate database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let db = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Self::from_pool(db).await
    }

    pub async fn from_pool(db: SqlitePool) -> Result<Self> {
        let store = Self { db };
        store.setup_schema().await?;
        Ok(store)
    }

    pub async fn setup_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                content TEXT NOT NULL,
                link TEXT NOT NULL,
                date TEXT NOT NULL,
                category TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        debug!("articles table ready");
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    pub fn get_db_pool(&self) -> &SqlitePool {
        &self.db
    }
}

#[async_trait]
impl ArticleStore for SqliteArticleStore {
    async fn insert_if_absent(&self, record: &ArticleRecord) -> InsertOutcome {
        let result = sqlx::query(
            r#"
            INSERT INTO articles (name, content, link, date, category)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(&record.name)
        .bind(&record.content)
        .bind(&record.link)
        .bind(&record.date)
        .bind(&record.category)
        .execute(&self.db)
        .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => {
                info!("Stored article: {}", record.name);
                InsertOutcome::Inserted
            }
            Ok(_) => {
                debug!("Article already stored: {}", record.name);
                InsertOutcome::DuplicateRejected
            }
            Err(e) => {
                warn!("Failed to store article {}: {}", record.name, e);
                InsertOutcome::Failed(e.to_string())
            }
        }
    }

    async fn list_all(&self) -> Result<Vec<ArticleRecord>> {
        let rows = sqlx::query("SELECT name, content, link, date, category FROM articles ORDER BY id")
            .fetch_all(&self.db)
            .await?;

        let mut articles = Vec::with_capacity(rows.len());
        for row in rows {
            articles.push(ArticleRecord {
                name: row.try_get("name")?,
                content: row.try_get("content")?,
                link: row.try_get("link")?,
                date: row.try_get("date")?,
                category: row.try_get("category")?,
            });
        }

        Ok(articles)
    }
}
