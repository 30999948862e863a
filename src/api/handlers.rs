// HTTP request handlers for API endpoints

use crate::api::models::*;
use crate::database_ops::db::Db;
use crate::database_ops::games;
use crate::database_ops::populate::{self, IngestState};
use actix_web::{web, HttpResponse, Result};

/// Health check endpoint
pub async fn health_check(db: web::Data<Db>) -> Result<HttpResponse> {
    let db_status = match sqlx::query_scalar::<_, bool>("SELECT true")
        .fetch_one(&db.pool)
        .await
    {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "database": db_status,
    })))
}

/// List every stored game
pub async fn list_games(db: web::Data<Db>) -> Result<HttpResponse> {
    match games::list_games(&db).await {
        Ok(list) => Ok(HttpResponse::Ok().json(list)),
        Err(err) => {
            tracing::error!(error = %err, "listing games failed");
            Ok(HttpResponse::InternalServerError().json(ErrorResponse::new("failed to list games")))
        }
    }
}

/// Create a game from the seven mutable fields
pub async fn create_game(
    db: web::Data<Db>,
    payload: web::Json<GamePayload>,
) -> Result<HttpResponse> {
    if let Err(message) = payload.validate() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(message)));
    }
    match games::create_game(&db, &payload).await {
        Ok(game) => Ok(HttpResponse::Ok().json(game)),
        Err(err) => {
            tracing::warn!(error = %err, "creating game failed");
            Ok(HttpResponse::BadRequest().json(ErrorResponse::new(err.to_string())))
        }
    }
}

/// Replace a game's mutable fields
pub async fn update_game(
    db: web::Data<Db>,
    path: web::Path<i64>,
    payload: web::Json<GamePayload>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    if let Err(message) = payload.validate() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(message)));
    }
    match games::update_game(&db, id, &payload).await {
        Ok(Some(game)) => Ok(HttpResponse::Ok().json(game)),
        Ok(None) => {
            Ok(HttpResponse::NotFound().json(ErrorResponse::new(format!("game {id} not found"))))
        }
        Err(err) => {
            tracing::warn!(game_id = id, error = %err, "updating game failed");
            Ok(HttpResponse::BadRequest().json(ErrorResponse::new(err.to_string())))
        }
    }
}

/// Hard-delete a game by id
pub async fn delete_game(db: web::Data<Db>, path: web::Path<i64>) -> Result<HttpResponse> {
    let id = path.into_inner();
    match games::delete_game(&db, id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(DeletedResponse { id })),
        Ok(false) => {
            Ok(HttpResponse::NotFound().json(ErrorResponse::new(format!("game {id} not found"))))
        }
        Err(err) => {
            tracing::warn!(game_id = id, error = %err, "deleting game failed");
            Ok(HttpResponse::BadRequest().json(ErrorResponse::new(err.to_string())))
        }
    }
}

/// Filter games by optional name substring and exact platform
pub async fn search_games(
    db: web::Data<Db>,
    payload: web::Json<SearchRequest>,
) -> Result<HttpResponse> {
    match games::search_games(&db, payload.name.as_deref(), payload.platform.as_deref()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(list)),
        Err(err) => {
            tracing::warn!(error = %err, "searching games failed");
            Ok(HttpResponse::BadRequest().json(ErrorResponse::new(err.to_string())))
        }
    }
}

/// Fetch the external catalogs and insert whatever is new
pub async fn populate_games(
    db: web::Data<Db>,
    ingest: web::Data<IngestState>,
) -> Result<HttpResponse> {
    // serialize concurrent populate requests; see IngestState
    let _guard = ingest.populate_lock.lock().await;

    match populate::populate(&db, &ingest.provider, &ingest.sources).await {
        Ok(inserted) => Ok(HttpResponse::Created().json(inserted)),
        Err(err) => {
            tracing::error!(error = %err, "populate failed");
            Ok(HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Internal error while inserting games")))
        }
    }
}
