pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod enrichment;
pub mod error;
pub mod geo;
pub mod handlers;
pub mod middleware;
pub mod policy;
pub mod state;
pub mod types;
pub mod validation;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::handlers::{animals, auth as login, categories, root, species, users};
use crate::middleware::{authenticate, gate, report_errors, species_image, BodyLimit};
use crate::state::AppState;
use crate::validation::rules;

/// The full HTTP surface over `state`.
pub fn app(state: AppState) -> Router {
    let cors = cors(&state.config.server.cors_origins);
    let body_limit = state.config.server.max_body_bytes;

    Router::new()
        .route("/", get(root::index))
        .route("/health", get(root::health))
        .merge(category_routes(&state))
        .merge(species_routes(&state))
        .merge(animal_routes(&state))
        .merge(user_routes())
        .route(
            "/auth/login",
            post(login::login).layer(from_fn_with_state(rules::login(), gate)),
        )
        .fallback(root::not_found)
        .layer(from_fn_with_state(state.clone(), report_errors))
        .layer(Extension(BodyLimit(body_limit)))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn category_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(categories::list).merge(
                post(categories::create).layer(
                    ServiceBuilder::new()
                        .layer(from_fn_with_state(state.clone(), authenticate))
                        .layer(from_fn_with_state(rules::category_create(), gate)),
                ),
            ),
        )
        .route(
            "/categories/:id",
            get(categories::get)
                .layer(from_fn_with_state(rules::id_param(), gate))
                .merge(
                    put(categories::update).layer(
                        ServiceBuilder::new()
                            .layer(from_fn_with_state(state.clone(), authenticate))
                            .layer(from_fn_with_state(rules::category_update(), gate)),
                    ),
                )
                .merge(
                    delete(categories::delete).layer(
                        ServiceBuilder::new()
                            .layer(from_fn_with_state(state.clone(), authenticate))
                            .layer(from_fn_with_state(rules::id_param(), gate)),
                    ),
                ),
        )
}

fn species_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/species",
            get(species::list).merge(
                post(species::create).layer(
                    ServiceBuilder::new()
                        .layer(from_fn_with_state(state.clone(), species_image))
                        .layer(from_fn_with_state(rules::species_create(), gate)),
                ),
            ),
        )
        .route("/species/area", get(species::area))
        .route(
            "/species/:id",
            get(species::get)
                .layer(from_fn_with_state(rules::id_param(), gate))
                .merge(
                    put(species::update).layer(
                        ServiceBuilder::new()
                            .layer(from_fn_with_state(state.clone(), species_image))
                            .layer(from_fn_with_state(rules::species_update(), gate)),
                    ),
                )
                .merge(
                    delete(species::delete)
                        .layer(from_fn_with_state(rules::id_param(), gate)),
                ),
        )
}

fn animal_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/animals",
            get(animals::list).merge(
                post(animals::create).layer(
                    ServiceBuilder::new()
                        .layer(from_fn_with_state(state.clone(), authenticate))
                        .layer(from_fn_with_state(rules::animal_create(), gate)),
                ),
            ),
        )
        .route(
            "/animals/:id",
            get(animals::get)
                .layer(from_fn_with_state(rules::id_param(), gate))
                .merge(
                    put(animals::update).layer(
                        ServiceBuilder::new()
                            .layer(from_fn_with_state(state.clone(), authenticate))
                            .layer(from_fn_with_state(rules::animal_update(), gate)),
                    ),
                )
                .merge(
                    delete(animals::delete).layer(
                        ServiceBuilder::new()
                            .layer(from_fn_with_state(state.clone(), authenticate))
                            .layer(from_fn_with_state(rules::id_param(), gate)),
                    ),
                ),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(users::list).merge(
                post(users::create).layer(from_fn_with_state(rules::user_create(), gate)),
            ),
        )
        .route(
            "/users/:id",
            get(users::get)
                .layer(from_fn_with_state(rules::id_param(), gate))
                .merge(
                    put(users::update)
                        .layer(from_fn_with_state(rules::user_update(), gate)),
                )
                .merge(
                    delete(users::delete)
                        .layer(from_fn_with_state(rules::id_param(), gate)),
                ),
        )
}

/// `*` or an empty list allows any origin.
fn cors(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    if allowed.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
