use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    auth::{token_from_header, Caller, RequestAuthenticator},
    config::Config,
    error::ResolveError,
    resolver::Resolver,
    store::RecordStore,
    types::{BookRecord, FavoriteToggle, StoredBook},
};

pub struct AppState {
    pub resolver: Resolver,
    pub store:    Arc<dyn RecordStore>,
    pub auth:     Arc<dyn RequestAuthenticator>,
    /// Upper bound for a single search or resolution
    pub timeout:  Option<Duration>,
}

#[derive(Debug)]
pub enum ApiError {
    Resolve(ResolveError),
    BadRequest(String),
    Unauthorized,
    Forbidden,
    NotFound,
    Internal(anyhow::Error),
}

impl From<ResolveError> for ApiError {
    fn from(e: ResolveError) -> Self {
        Self::Resolve(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        Self::BadRequest(e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Resolve(e) => {
                let status = match e {
                    ResolveError::InvalidIdentifier(_) | ResolveError::InvalidQuery => {
                        StatusCode::BAD_REQUEST
                    }
                    ResolveError::NotFound(_) => StatusCode::NOT_FOUND,
                    ResolveError::UpstreamUnavailable(_) | ResolveError::UpstreamMalformed(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                };
                if status == StatusCode::BAD_GATEWAY {
                    error!(error = %e, retryable = e.is_retryable(), "Upstream failure");
                }
                (status, e.to_string())
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided or are invalid".into(),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Only administrators may change the catalog".into(),
            ),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".into()),
            ApiError::Internal(e) => {
                error!(error = ?e, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/books/external-search", get(external_search))
        .route("/api/books/external/:identifier", get(external_resolve))
        .route("/api/books/local", get(list_books).post(create_book))
        .route("/api/books/local/my_favorites", get(my_favorites))
        .route("/api/books/local/import/:identifier", post(import_book))
        .route(
            "/api/books/local/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/api/books/local/:id/toggle_favorite", post(toggle_favorite))
        .with_state(state)
}

pub async fn start(config: &Config, state: AppState) -> anyhow::Result<()> {
    let app = router(Arc::new(state));
    let addr = SocketAddr::from((config.server.address, config.server.port));
    info!("Listening on {addr}.");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

impl AppState {
    async fn upstream<T>(&self, call: impl Future<Output = Result<T, ResolveError>>) -> ApiResult<T> {
        let result = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, call).await.map_err(|_| {
                ResolveError::UpstreamUnavailable(format!("no answer within {timeout:?}"))
            })?,
            None => call.await,
        };
        Ok(result?)
    }

    async fn caller(&self, headers: &HeaderMap) -> ApiResult<Caller> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|x| x.to_str().ok())
            .and_then(token_from_header)
            .ok_or(ApiError::Unauthorized)?;
        match self.auth.authenticate(token).await {
            Some(caller) => Ok(caller),
            None => {
                warn!("Rejected unknown token");
                Err(ApiError::Unauthorized)
            }
        }
    }

    async fn admin(&self, headers: &HeaderMap) -> ApiResult<Caller> {
        let caller = self.caller(headers).await?;
        if !caller.admin {
            warn!(username = %caller.username, "Refused catalog change");
            return Err(ApiError::Forbidden);
        }
        Ok(caller)
    }
}

fn validate(record: &BookRecord) -> ApiResult<()> {
    if record.title.trim().is_empty() {
        return Err(ApiError::BadRequest("A book needs a title".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn external_search(
    Query(params): Query<SearchParams>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<BookRecord>>> {
    let query = params.q.unwrap_or_default();
    info!("Received search {query:?}.");
    let results = state.upstream(state.resolver.search(&query)).await?;
    Ok(Json(results.collect()))
}

async fn external_resolve(
    Path(identifier): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BookRecord>> {
    info!("Received {identifier}.");
    let record = state.upstream(state.resolver.resolve(&identifier)).await?;
    Ok(Json(record))
}

async fn list_books(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<StoredBook>>> {
    Ok(Json(state.store.list().await?))
}

async fn get_book(
    id: Result<Path<i64>, PathRejection>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<StoredBook>> {
    let Path(id) = id?;
    let book = state.store.find(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(book))
}

async fn create_book(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    record: Result<Json<BookRecord>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StoredBook>)> {
    state.admin(&headers).await?;
    let Json(record) = record?;
    validate(&record)?;
    let id = state.store.save(&record).await?;
    let book = state.store.find(id).await?.ok_or(ApiError::NotFound)?;
    info!(id, title = %book.record.title, "Stored book");
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    id: Result<Path<i64>, PathRejection>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    record: Result<Json<BookRecord>, JsonRejection>,
) -> ApiResult<Json<StoredBook>> {
    state.admin(&headers).await?;
    let (Path(id), Json(record)) = (id?, record?);
    validate(&record)?;
    if !state.store.update(id, &record).await? {
        return Err(ApiError::NotFound);
    }
    let book = state.store.find(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(book))
}

async fn delete_book(
    id: Result<Path<i64>, PathRejection>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    state.admin(&headers).await?;
    let Path(id) = id?;
    if !state.store.delete(id).await? {
        return Err(ApiError::NotFound);
    }
    info!(id, "Deleted book");
    Ok(StatusCode::NO_CONTENT)
}

async fn import_book(
    Path(identifier): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<(StatusCode, Json<StoredBook>)> {
    state.admin(&headers).await?;
    let record = state.upstream(state.resolver.resolve(&identifier)).await?;
    let id = state.store.save(&record).await?;
    let book = state.store.find(id).await?.ok_or(ApiError::NotFound)?;
    info!(id, %identifier, "Imported book");
    Ok((StatusCode::CREATED, Json(book)))
}

async fn my_favorites(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<StoredBook>>> {
    let caller = state.caller(&headers).await?;
    Ok(Json(state.store.favorites(&caller.username).await?))
}

#[derive(Debug, Serialize)]
struct ToggleResponse {
    status:  FavoriteToggle,
    message: &'static str,
}

async fn toggle_favorite(
    id: Result<Path<i64>, PathRejection>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<(StatusCode, Json<ToggleResponse>)> {
    let caller = state.caller(&headers).await?;
    let Path(id) = id?;
    let toggle = state
        .store
        .toggle_favorite(&caller.username, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let status = match toggle {
        FavoriteToggle::Added => StatusCode::CREATED,
        FavoriteToggle::Removed => StatusCode::OK,
    };
    Ok((status, Json(ToggleResponse {
        status:  toggle,
        message: toggle.message(),
    })))
}
