// Postgres 存储实现

mod comment;
mod group;
mod post;

use sqlx::Executor;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;
use crate::database::StoreError;

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("SET application_name = 'forum_backend';")
                        .await?;
                    Ok(())
                })
            })
            .connect(&config.database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// 关闭连接池，等待已借出的连接归还
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
