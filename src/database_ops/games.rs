// Data access for the games table.

use crate::api::models::GamePayload;
use crate::database_ops::db::Db;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::QueryBuilder;

/// One persisted mobile application record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: i64,
    pub publisher_id: Option<i64>,
    pub name: String,
    pub platform: String,
    pub store_id: Option<i64>,
    pub bundle_id: Option<String>,
    pub app_version: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A Game-shaped record fetched from an external catalog, pending dedup and
/// insertion.
#[derive(Debug, Clone)]
pub struct GameDraft {
    pub publisher_id: Option<i64>,
    pub name: String,
    pub platform: String,
    pub store_id: Option<i64>,
    pub bundle_id: Option<String>,
    pub app_version: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn list_games(db: &Db) -> Result<Vec<Game>> {
    let games = sqlx::query_as::<_, Game>("SELECT * FROM games ORDER BY id")
        .fetch_all(&db.pool)
        .await?;
    Ok(games)
}

pub async fn create_game(db: &Db, payload: &GamePayload) -> Result<Game> {
    let now = Utc::now();
    let game = sqlx::query_as::<_, Game>(
        "INSERT INTO games (publisher_id, name, platform, store_id, bundle_id, app_version, is_published, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
         RETURNING *",
    )
    .bind(payload.publisher_id)
    .bind(&payload.name)
    .bind(&payload.platform)
    .bind(payload.store_id)
    .bind(payload.bundle_id.as_ref())
    .bind(payload.app_version.as_ref())
    .bind(payload.is_published)
    .bind(now)
    .fetch_one(&db.pool)
    .await?;
    Ok(game)
}

/// Full-field replacement. Returns None when the id does not exist.
pub async fn update_game(db: &Db, id: i64, payload: &GamePayload) -> Result<Option<Game>> {
    let game = sqlx::query_as::<_, Game>(
        "UPDATE games
         SET publisher_id = $1, name = $2, platform = $3, store_id = $4,
             bundle_id = $5, app_version = $6, is_published = $7, updated_at = $8
         WHERE id = $9
         RETURNING *",
    )
    .bind(payload.publisher_id)
    .bind(&payload.name)
    .bind(&payload.platform)
    .bind(payload.store_id)
    .bind(payload.bundle_id.as_ref())
    .bind(payload.app_version.as_ref())
    .bind(payload.is_published)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(&db.pool)
    .await?;
    Ok(game)
}

/// Hard delete. Returns false when the id does not exist.
pub async fn delete_game(db: &Db, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM games WHERE id = $1")
        .bind(id)
        .execute(&db.pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Optional substring match on name and exact match on platform; absent
/// filters impose no constraint. LIKE case rules follow the storage
/// collation (case-sensitive on PostgreSQL).
pub async fn search_games(
    db: &Db,
    name: Option<&str>,
    platform: Option<&str>,
) -> Result<Vec<Game>> {
    let mut qb: QueryBuilder<'_, sqlx::Postgres> =
        QueryBuilder::new("SELECT * FROM games WHERE 1=1");
    if let Some(name) = name.filter(|s| !s.is_empty()) {
        qb.push(" AND name LIKE ").push_bind(format!("%{name}%"));
    }
    if let Some(platform) = platform.filter(|s| !s.is_empty()) {
        qb.push(" AND platform = ").push_bind(platform.to_string());
    }
    qb.push(" ORDER BY id");
    let games = qb.build_query_as::<Game>().fetch_all(&db.pool).await?;
    Ok(games)
}

/// Names of every persisted game, for the ingest dedup set.
pub async fn list_game_names(db: &Db) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>("SELECT name FROM games")
        .fetch_all(&db.pool)
        .await?;
    Ok(names)
}

/// Insert a batch of drafts in one statement and return the persisted rows.
pub async fn bulk_insert_games(db: &Db, drafts: &[GameDraft]) -> Result<Vec<Game>> {
    if drafts.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<'_, sqlx::Postgres> = QueryBuilder::new(
        "INSERT INTO games (publisher_id, name, platform, store_id, bundle_id, app_version, is_published, created_at, updated_at) ",
    );
    qb.push_values(drafts, |mut b, d| {
        b.push_bind(d.publisher_id)
            .push_bind(&d.name)
            .push_bind(&d.platform)
            .push_bind(d.store_id)
            .push_bind(d.bundle_id.as_ref())
            .push_bind(d.app_version.as_ref())
            .push_bind(d.is_published)
            .push_bind(d.created_at)
            .push_bind(d.updated_at);
    });
    qb.push(" RETURNING *");
    let inserted = qb.build_query_as::<Game>().fetch_all(&db.pool).await?;
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_serializes_with_camel_case_keys() {
        let now = Utc::now();
        let game = Game {
            id: 1,
            publisher_id: Some(12),
            name: "Helix Jump".to_string(),
            platform: "ios".to_string(),
            store_id: Some(1345968745),
            bundle_id: Some("com.h2g.helixjump".to_string()),
            app_version: Some("2.4.4".to_string()),
            is_published: true,
            created_at: now,
            updated_at: now,
        };
        let v = serde_json::to_value(&game).unwrap();
        assert_eq!(v["publisherId"], 12);
        assert_eq!(v["storeId"], 1345968745i64);
        assert_eq!(v["bundleId"], "com.h2g.helixjump");
        assert_eq!(v["appVersion"], "2.4.4");
        assert_eq!(v["isPublished"], true);
        assert!(v.get("publisher_id").is_none());
    }
}
