/**
 * API Routes
 *
 * Every `/api` endpoint, grouped by resource.
 *
 * # Authentication
 *
 * Only signup and login are public. Everything else sits behind
 * `auth_middleware` through `route_layer`, and the `/api/users` group also
 * passes the admin role gate.
 *
 * # Path Parameters
 *
 * Routes sharing a prefix must use the same parameter name at the same
 * position, so ticket and sprint routes use `{id}` for their first segment.
 * Depending on the method it names a project, ticket or sprint; handlers
 * extract path values by position.
 */

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};

use crate::backend::auth::{delete_me, get_me, list_users, login, signup, update_user_role};
use crate::backend::middleware::{auth_middleware, require_admin};
use crate::backend::profiles::handlers as profiles;
use crate::backend::projects::handlers as projects;
use crate::backend::server::state::AppState;
use crate::backend::sprints::handlers as sprints;
use crate::backend::tickets::handlers as tickets;

/// Configure API routes
///
/// ## Public
/// - `POST /api/auth/signup` - User registration
/// - `POST /api/auth/login` - User login
///
/// ## Authenticated
/// - `/api/auth/me`, `/api/projects`, `/api/tickets`, `/api/sprints`, `/api/profiles`
///
/// ## Admin
/// - `GET /api/users`, `PUT /api/users/{user_id}/role`
pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let authenticated = from_fn_with_state(app_state.clone(), auth_middleware);

    let protected = Router::new()
        .merge(account_routes())
        .merge(project_routes())
        .merge(ticket_routes())
        .merge(sprint_routes())
        .merge(profile_routes())
        .route_layer(authenticated.clone());

    let admin = user_routes()
        .route_layer(from_fn(require_admin))
        .route_layer(authenticated);

    router
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .merge(protected)
        .merge(admin)
}

fn account_routes() -> Router<AppState> {
    Router::new().route("/api/auth/me", get(get_me).delete(delete_me))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/{user_id}/role", put(update_user_role))
}

fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/api/projects", post(projects::create_project))
        .route("/api/projects/me", get(projects::get_my_projects))
        .route(
            "/api/projects/{project_id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/api/projects/{project_id}/developers", put(projects::add_developer))
        .route(
            "/api/projects/{project_id}/developers/{user_id}",
            delete(projects::remove_developer),
        )
        .route("/api/projects/comment/{project_id}", put(projects::add_comment))
        .route(
            "/api/projects/comment/{project_id}/{comment_id}",
            delete(projects::delete_comment),
        )
}

fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tickets/me", get(tickets::get_my_tickets))
        .route("/api/tickets/project/{project_id}", get(tickets::get_project_tickets))
        .route("/api/tickets/comment/{ticket_id}", put(tickets::add_comment))
        // GET takes a ticket id, POST a project id
        .route("/api/tickets/{id}", get(tickets::get_ticket).post(tickets::create_ticket))
        .route(
            "/api/tickets/{id}/{ticket_id}",
            put(tickets::update_ticket).delete(tickets::delete_ticket),
        )
}

fn sprint_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sprints/project/{project_id}", get(sprints::get_project_sprints))
        .route("/api/sprints/comment/{sprint_id}", put(sprints::add_comment))
        // GET and PUT take a sprint id, POST a project id
        .route(
            "/api/sprints/{id}",
            get(sprints::get_sprint)
                .put(sprints::update_sprint)
                .post(sprints::create_sprint),
        )
        .route(
            "/api/sprints/{id}/tickets/{ticket_id}",
            put(sprints::add_ticket).delete(sprints::remove_ticket),
        )
        .route("/api/sprints/{id}/{sprint_id}", delete(sprints::delete_sprint))
}

fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/profiles",
            get(profiles::list_profiles)
                .post(profiles::upsert_profile)
                .delete(profiles::delete_my_profile),
        )
        .route("/api/profiles/me", get(profiles::get_my_profile))
        .route(
            "/api/profiles/user/{user_id}",
            get(profiles::get_user_profile).delete(profiles::delete_user_profile),
        )
        .route("/api/profiles/comment/{user_id}", put(profiles::add_comment))
}
