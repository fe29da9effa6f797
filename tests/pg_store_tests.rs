//! Postgres 存储测试
//!
//! 每个测试由 `#[sqlx::test]` 建立独立的测试库并执行迁移。
//! 需要 `DATABASE_URL` 指向可用的 Postgres：`cargo test -- --ignored`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use forum_backend::database::models::{GroupAdmin, GroupMember, NewComment, NewGroup, NewPost};
use forum_backend::database::{CommentStore, GroupStore, PgRecordStore, PostStore, StoreError};
use sqlx::PgPool;

fn new_group(name: &str) -> NewGroup {
    NewGroup {
        name: name.to_string(),
        private: false,
    }
}

fn new_post(group_id: i64, title: &str) -> NewPost {
    NewPost {
        group_id,
        title: title.to_string(),
        content: "body".to_string(),
    }
}

async fn members(pool: &PgPool, group_id: i64) -> Result<Vec<GroupMember>, StoreError> {
    Ok(sqlx::query_as::<_, GroupMember>(
        "SELECT group_id, user_id FROM group_members WHERE group_id = $1 ORDER BY user_id",
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?)
}

async fn admins(pool: &PgPool, group_id: i64) -> Result<Vec<GroupAdmin>, StoreError> {
    Ok(sqlx::query_as::<_, GroupAdmin>(
        "SELECT group_id, user_id FROM group_admins WHERE group_id = $1 ORDER BY user_id",
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?)
}

/// 创建群组后，创建者同时是成员和管理员
#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn add_group_makes_owner_member_and_admin(pool: PgPool) -> Result<(), StoreError> {
    let store = PgRecordStore::new(pool.clone());

    let group = store.add_group(new_group("rustaceans"), 7).await?;

    assert_eq!(group.name, "rustaceans");
    assert!(!group.private);
    assert_eq!(
        members(&pool, group.id).await?,
        vec![GroupMember {
            group_id: group.id,
            user_id: 7
        }]
    );
    assert_eq!(
        admins(&pool, group.id).await?,
        vec![GroupAdmin {
            group_id: group.id,
            user_id: 7
        }]
    );

    let fetched = store.get_group(group.id).await?.expect("group stored");
    assert_eq!(fetched, group);
    assert_eq!(store.list_groups().await?, vec![group]);

    Ok(())
}

/// 重复添加成员或管理员不报错，也不产生重复行
#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn repeated_member_and_admin_inserts_are_noops(pool: PgPool) -> Result<(), StoreError> {
    let store = PgRecordStore::new(pool.clone());
    let group = store.add_group(new_group("one"), 7).await?;

    store.add_group_member(group.id, 8).await?;
    store.add_group_member(group.id, 8).await?;
    store.add_group_member(group.id, 7).await?;
    store.add_group_admin(group.id, 7).await?;
    store.add_group_admin(group.id, 7).await?;

    let member_ids: Vec<i64> = members(&pool, group.id)
        .await?
        .into_iter()
        .map(|m| m.user_id)
        .collect();
    assert_eq!(member_ids, vec![7, 8]);
    assert_eq!(admins(&pool, group.id).await?.len(), 1);

    Ok(())
}

/// 按群组过滤帖子，过滤条件为空时返回全部
#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn list_posts_filters_by_group(pool: PgPool) -> Result<(), StoreError> {
    let store = PgRecordStore::new(pool);

    let mut group_ids = Vec::new();
    for name in ["one", "two", "three"] {
        group_ids.push(store.add_group(new_group(name), 7).await?.id);
    }
    for (i, group_id) in group_ids.iter().enumerate() {
        let post = store.add_post(new_post(*group_id, &format!("post {i}")), 8).await?;
        assert_eq!(post.user_id, 8);
        assert_eq!(post.group_id, *group_id);
    }

    let filtered = store.list_posts(&[group_ids[0], group_ids[2]]).await?;
    let filtered_groups: Vec<i64> = filtered.iter().map(|p| p.group_id).collect();
    assert_eq!(filtered_groups, vec![group_ids[0], group_ids[2]]);

    let all = store.list_posts(&[]).await?;
    assert_eq!(all.len(), 3);

    assert!(store.list_posts(&[i64::MAX]).await?.is_empty());

    Ok(())
}

/// 按帖子过滤评论
#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn list_comments_filters_by_post(pool: PgPool) -> Result<(), StoreError> {
    let store = PgRecordStore::new(pool);
    let group = store.add_group(new_group("one"), 7).await?;
    let first = store.add_post(new_post(group.id, "first"), 7).await?;
    let second = store.add_post(new_post(group.id, "second"), 7).await?;

    let mut comment_ids = Vec::new();
    for (post_id, content) in [(first.id, "a"), (second.id, "b"), (second.id, "c")] {
        let comment = store
            .add_comment(
                NewComment {
                    post_id,
                    content: content.to_string(),
                },
                9,
            )
            .await?;
        comment_ids.push(comment.id);
    }

    let on_second: Vec<String> = store
        .list_comments(&[second.id])
        .await?
        .into_iter()
        .map(|c| c.content)
        .collect();
    assert_eq!(on_second, vec!["b", "c"]);
    assert_eq!(store.list_comments(&[]).await?.len(), 3);

    let comment = store.get_comment(comment_ids[0]).await?.expect("comment stored");
    assert_eq!((comment.post_id, comment.user_id), (first.id, 9));
    assert_eq!(comment.content, "a");

    Ok(())
}

/// 未知ID返回 None
#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn unknown_ids_are_none(pool: PgPool) -> Result<(), StoreError> {
    let store = PgRecordStore::new(pool);

    assert!(store.get_group(404).await?.is_none());
    assert!(store.get_post(404).await?.is_none());
    assert!(store.get_comment(404).await?.is_none());

    Ok(())
}

/// 帖子内容受 VARCHAR(500) 约束
#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn oversized_content_is_rejected_by_schema(pool: PgPool) -> Result<(), StoreError> {
    let store = PgRecordStore::new(pool);
    let group = store.add_group(new_group("one"), 7).await?;

    let post = NewPost {
        content: "x".repeat(501),
        ..new_post(group.id, "long")
    };
    assert!(matches!(
        store.add_post(post, 7).await,
        Err(StoreError::Database(_))
    ));

    Ok(())
}
