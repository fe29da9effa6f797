// 群组存储库

use async_trait::async_trait;

use super::PgRecordStore;
use crate::database::models::{Group, NewGroup};
use crate::database::{GroupStore, StoreError};

const GROUP_COLUMNS: &str = "id, name, private, created_at, updated_at";

#[async_trait]
impl GroupStore for PgRecordStore {
    async fn add_group(&self, group: NewGroup, owner: i64) -> Result<Group, StoreError> {
        // 群组、创建者成员关系、管理员关系在同一事务中写入
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Group>(&format!(
            "INSERT INTO groups (name, private) VALUES ($1, $2) RETURNING {GROUP_COLUMNS}"
        ))
        .bind(&group.name)
        .bind(group.private)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO group_members (group_id, user_id) VALUES ($1, $2)")
            .bind(created.id)
            .bind(owner)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO group_admins (group_id, user_id) VALUES ($1, $2)")
            .bind(created.id)
            .bind(owner)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!("Created group {} owned by {}", created.id, owner);
        Ok(created)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        let groups = sqlx::query_as::<_, Group>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    async fn get_group(&self, id: i64) -> Result<Option<Group>, StoreError> {
        let group = sqlx::query_as::<_, Group>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn add_group_member(&self, group_id: i64, user_id: i64) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn add_group_admin(&self, group_id: i64, user_id: i64) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO group_admins (group_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
