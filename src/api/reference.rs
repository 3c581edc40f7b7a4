//! Read-only reference endpoints, health and session issuance

use crate::api::reference::schemas::{
    CategoryList, HealthChecks, HealthStatus, Leaderboard, LeaderboardQuery, SessionCreated,
    SuggestionList, SuggestionQuery,
};
use crate::api::{ExtractSession, SESSION_COOKIE};
use crate::core::error::ArenaError;
use crate::core::random::ArenaRandom;
use crate::infrastructure::catalog::ReferenceData;
use crate::infrastructure::config::ArenaConfig;
use axum::extract::Query;
use axum::extract::rejection::QueryRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use di_axum::Inject;
use log::info;
use uuid::Uuid;

const DEFAULT_LEADERBOARD_SIZE: usize = 50;
const MAX_LEADERBOARD_SIZE: usize = 100;
const DEFAULT_SUGGESTIONS: usize = 10;
const MAX_SUGGESTIONS: usize = 50;
const SESSION_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 30;

pub fn router() -> Router {
    Router::new()
        .route("/categories", get(categories))
        .route("/leaderboard", get(leaderboard))
        .route("/prompt-suggestions", get(prompt_suggestions))
        .route("/health", get(health))
        .route("/session", post(create_session))
}

async fn categories(Inject(reference): Inject<ReferenceData>) -> Json<CategoryList> {
    Json(CategoryList {
        categories: reference.categories().to_vec(),
    })
}

async fn leaderboard(
    Inject(reference): Inject<ReferenceData>,
    Inject(random): Inject<ArenaRandom>,
    query: Result<Query<LeaderboardQuery>, QueryRejection>,
) -> Result<Json<Leaderboard>, ArenaError> {
    let Query(query) =
        query.map_err(|rejection| ArenaError::invalid_argument(rejection.body_text()))?;

    let category = query
        .category
        .filter(|category| !category.is_empty())
        .ok_or_else(|| ArenaError::invalid_argument("category parameter is required"))?;
    if reference.category(&category).is_none() {
        return Err(ArenaError::not_found("Category not found"));
    }

    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_SIZE)
        .min(MAX_LEADERBOARD_SIZE);
    let mut entries = reference.leaderboard(&random);
    entries.truncate(limit);

    Ok(Json(Leaderboard { category, entries }))
}

async fn prompt_suggestions(
    Inject(reference): Inject<ReferenceData>,
    Inject(random): Inject<ArenaRandom>,
    query: Result<Query<SuggestionQuery>, QueryRejection>,
) -> Result<Json<SuggestionList>, ArenaError> {
    let Query(query) =
        query.map_err(|rejection| ArenaError::invalid_argument(rejection.body_text()))?;
    let limit = query.limit.unwrap_or(DEFAULT_SUGGESTIONS).min(MAX_SUGGESTIONS);

    Ok(Json(SuggestionList {
        suggestions: reference.suggestions(&random, limit),
    }))
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        service: "arena-api-mock",
        api: "/api/v1",
        timestamp: Utc::now(),
        checks: HealthChecks {
            database: "ok",
            redis: "ok",
            storage: "ok",
        },
    })
}

async fn create_session(
    Inject(config): Inject<ArenaConfig>,
    ExtractSession(existing): ExtractSession,
) -> Response {
    if existing.is_some() {
        return StatusCode::NO_CONTENT.into_response();
    }

    let session_id = Uuid::new_v4();
    let mut cookie = format!(
        "{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_MAX_AGE_SECS}"
    );
    if config.secure_cookies {
        cookie.push_str("; Secure");
    }
    info!("issued session {session_id}");

    (
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(SessionCreated { session_id }),
    )
        .into_response()
}

pub mod schemas {
    use crate::infrastructure::catalog::{Category, LeaderboardEntry, PromptSuggestion};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Serialize, Debug)]
    pub struct CategoryList {
        pub categories: Vec<Category>,
    }

    #[derive(Deserialize, Debug)]
    pub struct LeaderboardQuery {
        pub category: Option<String>,
        pub limit: Option<usize>,
    }

    #[derive(Serialize, Debug)]
    pub struct Leaderboard {
        pub category: String,
        pub entries: Vec<LeaderboardEntry>,
    }

    #[derive(Deserialize, Debug)]
    pub struct SuggestionQuery {
        pub limit: Option<usize>,
    }

    #[derive(Serialize, Debug)]
    pub struct SuggestionList {
        pub suggestions: Vec<PromptSuggestion>,
    }

    #[derive(Serialize, Debug)]
    pub struct HealthChecks {
        pub database: &'static str,
        pub redis: &'static str,
        pub storage: &'static str,
    }

    #[derive(Serialize, Debug)]
    pub struct HealthStatus {
        pub status: &'static str,
        pub service: &'static str,
        pub api: &'static str,
        pub timestamp: DateTime<Utc>,
        pub checks: HealthChecks,
    }

    #[derive(Serialize, Debug)]
    pub struct SessionCreated {
        pub session_id: Uuid,
    }
}
