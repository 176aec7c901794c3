// src/routes.rs

use std::sync::Arc;

use axum::{
    Router, http::Method, middleware,
    routing::{delete, get, post, put},
};
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, badge, discussion, profile, quiz, topic},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, topics, materials, quiz, badges,
///   profile, admin).
/// * Applies global middleware (Trace, CORS) and rate limiting on the
///   auth endpoints.
/// * Injects global state (pool + config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // Brute-force protection on credential endpoints only.
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(5)
            .burst_size(20)
            .finish()
            .unwrap(),
    );

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(GovernorLayer::new(governor_conf));

    let topic_routes = Router::new()
        .route("/", get(topic::list_topics))
        .route("/{id}", get(topic::get_topic));

    let material_routes = Router::new()
        .route("/", get(topic::list_materials))
        .route("/{id}", get(topic::get_material))
        // Discussion requires login, reading materials does not.
        .merge(
            Router::new()
                .route(
                    "/{id}/comments",
                    get(discussion::list_comments).post(discussion::create_comment),
                )
                .route(
                    "/{id}/comments/{comment_id}",
                    delete(discussion::delete_comment),
                )
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let quiz_routes = Router::new()
        .route("/leaderboard", get(quiz::get_leaderboard))
        .route("/{material_id}", get(quiz::get_material_quiz))
        // Protected quiz routes
        .merge(
            Router::new()
                .route("/submit", post(quiz::submit_answer))
                .route("/{material_id}/progress", get(quiz::get_material_progress))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let badge_routes = Router::new()
        .route("/", get(badge::list_badges))
        .route("/{id}", get(badge::get_badge));

    let profile_routes = Router::new()
        .route("/me", get(profile::get_me))
        .route("/level", get(profile::get_my_level))
        .route("/badges", get(profile::get_my_badges))
        .route("/progress", get(profile::list_my_progress))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route("/topics", post(admin::create_topic))
        .route("/materials", post(admin::create_material))
        .route("/materials/{id}", delete(admin::delete_material))
        .route("/questions", post(admin::create_question))
        .route("/questions/{id}", delete(admin::delete_question))
        .route("/badges", post(admin::create_badge))
        .route(
            "/badges/{id}",
            put(admin::update_badge).delete(admin::delete_badge),
        )
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/topics", topic_routes)
        .nest("/api/materials", material_routes)
        .nest("/api/quiz", quiz_routes)
        .nest("/api/badges", badge_routes)
        .nest("/api/profile", profile_routes)
        .nest("/api/admin", admin_routes)
        .route("/api/levels", get(badge::list_levels))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
