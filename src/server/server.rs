use anyhow::{Context, Result};
use std::time::Duration;

use tracing::info;

use axum_extra::extract::cookie::{Cookie, SameSite};
use tower_http::services::ServeDir;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::admin_routes::make_admin_routes;
use super::document_routes::{make_catalog_routes, make_document_routes};
use super::error::ApiError;
use super::session::{Session, COOKIE_SESSION_TOKEN_KEY};
use super::{log_requests, state::*};
use crate::contact::NewContactQuery;
use crate::notifications::PORTAL_NAME;
use crate::user::auth::AuthTokenValue;
use crate::user::{ProfileUpdate, Registration, User};

#[derive(Serialize)]
struct ServerStats {
    pub portal: &'static str,
    pub uptime: String,
    pub user_id: Option<usize>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
    user: User,
}

#[derive(Deserialize)]
struct ChangePasswordBody {
    pub old_password: String,
    pub new_password: String,
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        portal: PORTAL_NAME,
        uptime: format_uptime(state.start_time.elapsed()),
        user_id: session.map(|s| s.user_id),
    };
    Json(stats)
}

async fn register(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<Registration>,
) -> Result<Response, ApiError> {
    let user = user_manager.register(body).await?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<LoginBody>,
) -> Result<Response, ApiError> {
    let (user, auth_token) = user_manager.login(&body.email, &body.password)?;
    info!("User {} logged in", user.id);

    let cookie = Cookie::build((COOKIE_SESSION_TOKEN_KEY, auth_token.value.0.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    let cookie_value = HeaderValue::from_str(&cookie.to_string()).map_err(ApiError::internal)?;

    let mut response = (
        StatusCode::CREATED,
        Json(LoginSuccessResponse {
            token: auth_token.value.0,
            user,
        }),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::SET_COOKIE, cookie_value);
    Ok(response)
}

async fn logout(
    State(user_manager): State<GuardedUserManager>,
    session: Session,
) -> Result<Response, ApiError> {
    user_manager.logout(session.user_id, &AuthTokenValue(session.token))?;

    let cookie = Cookie::build((COOKIE_SESSION_TOKEN_KEY, ""))
        .path("/")
        .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1))
        .same_site(SameSite::Lax)
        .build();
    let cookie_value = HeaderValue::from_str(&cookie.to_string()).map_err(ApiError::internal)?;

    let mut response = StatusCode::OK.into_response();
    response
        .headers_mut()
        .insert(header::SET_COOKIE, cookie_value);
    Ok(response)
}

async fn get_profile(
    State(user_manager): State<GuardedUserManager>,
    session: Session,
) -> Result<Json<User>, ApiError> {
    Ok(Json(user_manager.get_user(session.user_id)?))
}

async fn put_profile(
    State(user_manager): State<GuardedUserManager>,
    session: Session,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(user_manager.update_profile(session.user_id, body)?))
}

async fn put_password(
    State(user_manager): State<GuardedUserManager>,
    session: Session,
    Json(body): Json<ChangePasswordBody>,
) -> Result<StatusCode, ApiError> {
    user_manager.change_password(session.user_id, &body.old_password, &body.new_password)?;
    info!("User {} changed password", session.user_id);
    Ok(StatusCode::NO_CONTENT)
}

async fn post_contact(
    State(contact): State<GuardedContactService>,
    Json(body): Json<NewContactQuery>,
) -> Result<Response, ApiError> {
    let query = contact.submit(body).await?;
    Ok((StatusCode::CREATED, Json(query)).into_response())
}

pub fn make_app(state: ServerState) -> Result<Router> {
    let auth_routes: Router = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .with_state(state.clone());

    let user_routes: Router = Router::new()
        .route("/profile", get(get_profile).put(put_profile))
        .route("/password", put(put_password))
        .with_state(state.clone());

    let contact_routes: Router = Router::new()
        .route("/", post(post_contact))
        .with_state(state.clone());

    let home_router: Router = match &state.config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app: Router = home_router
        .nest("/v1/auth", auth_routes)
        .nest("/v1/user", user_routes)
        .nest("/v1/catalog", make_catalog_routes(state.clone()))
        .nest("/v1/documents", make_document_routes(state.clone()))
        .nest("/v1/admin", make_admin_routes(state.clone()))
        .nest("/v1/contact", contact_routes)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub async fn run_server(state: ServerState) -> Result<()> {
    let port = state.config.port;
    let app = make_app(state)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FsBlobStore, UploadPolicy};
    use crate::notifications::MemoryNotifier;
    use crate::server::ServerConfig;
    use crate::sqlite_persistence::SqliteDatabase;
    use axum::{body::Body, http::Request};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn test_app() -> (Router, TempDir) {
        let media = TempDir::new().unwrap();
        let state = ServerState::new(
            ServerConfig {
                requests_logging_level: crate::server::RequestsLoggingLevel::None,
                ..Default::default()
            },
            SqliteDatabase::open_in_memory().unwrap(),
            Arc::new(FsBlobStore::new(media.path()).await.unwrap()),
            Arc::new(MemoryNotifier::new()),
            UploadPolicy::default(),
        );
        (make_app(state).unwrap(), media)
    }

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(
            format_uptime(Duration::from_secs(86_400 + 3600 * 2 + 60 * 3 + 4)),
            "1d 02:03:04"
        );
    }

    #[tokio::test]
    async fn responds_unauthorized_on_protected_routes() {
        let (app, _media) = test_app().await;

        let protected_routes = vec![
            ("GET", "/v1/auth/logout"),
            ("GET", "/v1/user/profile"),
            ("GET", "/v1/catalog"),
            ("GET", "/v1/documents/mine"),
            ("GET", "/v1/documents/1/file"),
            ("DELETE", "/v1/documents/1"),
            ("GET", "/v1/admin/stats"),
            ("GET", "/v1/admin/documents"),
            ("PUT", "/v1/admin/documents/1/status"),
            ("GET", "/v1/admin/users"),
            ("GET", "/v1/admin/queries"),
        ];

        for (method, route) in protected_routes.into_iter() {
            let request = Request::builder()
                .method(method)
                .uri(route)
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "{} {}",
                method,
                route
            );
        }
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let (app, _media) = test_app().await;
        let request = Request::builder()
            .uri("/v1/user/profile")
            .header("Authorization", "not-a-real-token")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn home_is_public() {
        let (app, _media) = test_app().await;
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
