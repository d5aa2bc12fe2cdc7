#![cfg(feature = "postgres-tests")]

use chrono::{DateTime, Utc};
use post_service::data::{
    LikeRepository, PostRepository, PostShareRepository, PostgresLikeRepository,
    PostgresPostRepository, PostgresPostShareRepository,
};
use post_service::domain::{DomainError, Like, Post, PostRelations, PostShare, SortOrder, User};
use post_service::infrastructure::config::AppConfig;
use sqlx::{PgPool, Row};

const SCHEMA: &str = include_str!("fixtures/schema.sql");

async fn create_schema(pool: &PgPool) {
    sqlx::raw_sql(SCHEMA).execute(pool).await.unwrap();
}

async fn insert_user(pool: &PgPool, username: &str) -> User {
    let row = sqlx::query(
        r#"
        INSERT INTO users (username, email, created_at)
        VALUES ($1, $2, NOW())
        RETURNING id, created_at
        "#,
    )
    .bind(username)
    .bind(format!("{}@example.com", username))
    .fetch_one(pool)
    .await
    .unwrap();

    User {
        id: row.get("id"),
        username: username.to_string(),
        email: format!("{}@example.com", username),
        created_at: row.get("created_at"),
    }
}

async fn insert_comment(pool: &PgPool, post_id: i64, author_id: i64, body: &str) {
    sqlx::query("INSERT INTO comments (post_id, author_id, body) VALUES ($1, $2, $3)")
        .bind(post_id)
        .bind(author_id)
        .bind(body)
        .execute(pool)
        .await
        .unwrap();
}

fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + seconds, 0).unwrap()
}

#[sqlx::test(migrations = false)]
async fn find_by_id_loads_requested_relations(pool: PgPool) {
    create_schema(&pool).await;
    let alice = insert_user(&pool, "alice").await;
    let bob = insert_user(&pool, "bob").await;
    let repo = PostgresPostRepository::new(pool.clone());

    let post = repo
        .insert(Post::new("Title".into(), "Body".into(), &alice))
        .await
        .unwrap();
    insert_comment(&pool, post.id, bob.id, "first!").await;

    let full = repo
        .find_by_id(post.id, PostRelations::FULL)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(full.author, Some(alice.clone()));
    assert_eq!(full.comments.len(), 1);
    assert_eq!(full.comments[0].body, "first!");
    assert_eq!(full.comments[0].author, Some(bob));

    let bare = repo
        .find_by_id(post.id, PostRelations::NONE)
        .await
        .unwrap()
        .unwrap();
    assert!(bare.author.is_none());
    assert!(bare.comments.is_empty());
}

#[sqlx::test(migrations = false)]
async fn soft_remove_keeps_row_but_hides_it(pool: PgPool) {
    create_schema(&pool).await;
    let alice = insert_user(&pool, "alice").await;
    let repo = PostgresPostRepository::new(pool.clone());

    let kept = repo
        .insert(Post::new("Kept".into(), "Body".into(), &alice))
        .await
        .unwrap();
    let gone = repo
        .insert(Post::new("Gone".into(), "Body".into(), &alice))
        .await
        .unwrap();

    repo.soft_remove(gone.id).await.unwrap();

    assert!(repo
        .find_by_id(gone.id, PostRelations::NONE)
        .await
        .unwrap()
        .is_none());
    let ids: Vec<i64> = repo
        .find_all(PostRelations::NONE)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![kept.id]);

    let status: String = sqlx::query("SELECT status FROM posts WHERE id = $1")
        .bind(gone.id)
        .fetch_one(&pool)
        .await
        .unwrap()
        .get("status");
    assert_eq!(status, "deleted");

    let err = repo.soft_remove(gone.id).await.unwrap_err();
    assert!(matches!(err, DomainError::PostNotFound(id) if id == gone.id));
}

#[sqlx::test(migrations = false)]
async fn shares_are_ordered_and_joined_to_active_posts(pool: PgPool) {
    create_schema(&pool).await;
    let alice = insert_user(&pool, "alice").await;
    let bob = insert_user(&pool, "bob").await;
    let posts = PostgresPostRepository::new(pool.clone());
    let shares = PostgresPostShareRepository::new(pool.clone());

    let mut ids = Vec::new();
    for title in ["One", "Two", "Three"] {
        let post = posts
            .insert(Post::new(title.into(), "Body".into(), &alice))
            .await
            .unwrap();
        ids.push(post.id);
    }
    let (one, two, three) = (ids[0], ids[1], ids[2]);
    insert_comment(&pool, three, alice.id, "on three").await;

    for (post_id, offset) in [(three, 3), (one, 1), (two, 2)] {
        shares
            .insert(PostShare {
                shared_at: at(offset),
                ..PostShare::new(post_id, bob.id)
            })
            .await
            .unwrap();
    }
    posts.soft_remove(two).await.unwrap();

    let found = shares
        .find_by_user(bob.id, SortOrder::Desc, Some(PostRelations::FULL))
        .await
        .unwrap();
    let order: Vec<i64> = found.iter().map(|s| s.post_id).collect();
    assert_eq!(order, vec![three, two, one]);

    let newest = found[0].post.as_ref().unwrap();
    assert_eq!(newest.id, three);
    assert_eq!(newest.author, Some(alice.clone()));
    assert_eq!(newest.comments.len(), 1);
    assert!(found[1].post.is_none());
    assert_eq!(found[2].post.as_ref().map(|p| p.id), Some(one));
    assert!(found[2].post.as_ref().unwrap().comments.is_empty());

    let bare = shares
        .find_by_user(bob.id, SortOrder::Asc, None)
        .await
        .unwrap();
    let order: Vec<i64> = bare.iter().map(|s| s.post_id).collect();
    assert_eq!(order, vec![one, two, three]);
    assert!(bare.iter().all(|s| s.post.is_none()));
}

#[sqlx::test(migrations = false)]
async fn unique_violations_map_to_conflicts(pool: PgPool) {
    create_schema(&pool).await;
    let likes = PostgresLikeRepository::new(pool.clone());
    let shares = PostgresPostShareRepository::new(pool.clone());

    likes.insert(Like::new(1, 2)).await.unwrap();
    let err = likes.insert(Like::new(1, 2)).await.unwrap_err();
    assert!(matches!(err, DomainError::AlreadyLiked));

    shares.insert(PostShare::new(1, 2)).await.unwrap();
    let err = shares.insert(PostShare::new(1, 2)).await.unwrap_err();
    assert!(matches!(err, DomainError::AlreadyShared));
}

#[sqlx::test(migrations = false)]
async fn likes_are_listed_and_hard_deleted(pool: PgPool) {
    create_schema(&pool).await;
    let likes = PostgresLikeRepository::new(pool.clone());

    let first = likes.insert(Like::new(7, 1)).await.unwrap();
    let second = likes.insert(Like::new(7, 2)).await.unwrap();
    likes.insert(Like::new(8, 1)).await.unwrap();

    let ids: Vec<i64> = likes
        .find_by_post(7)
        .await
        .unwrap()
        .iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);

    likes.remove(first.id).await.unwrap();
    assert!(likes.find_by_post_and_user(7, 1).await.unwrap().is_none());

    let remaining: i64 = sqlx::query("SELECT COUNT(*) AS count FROM likes")
        .fetch_one(&pool)
        .await
        .unwrap()
        .get("count");
    assert_eq!(remaining, 2);
}

#[tokio::test]
async fn start_connects_with_environment_config() {
    let config = AppConfig::from_env().unwrap();
    post_service::start(&config).await.unwrap();
}
