//! Staff-only route guard.
//!
//! Provides an extractor for dashboard handlers that only active staff
//! accounts may reach. The session only identifies the account; staff and
//! active flags are read from the database on every request.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use sqlx::PgPool;
use tower_sessions::Session;

use greenleaf_core::UserId;

use crate::db::UserRepository;
use crate::models::{CurrentUser, session_keys};

/// Where anonymous and non-staff visitors are sent to log in.
pub const LOGIN_URL: &str = "/account/login/";

/// Extractor that requires an active staff account.
///
/// The router state must provide a `PgPool` (via `FromRef`).
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireStaff(staff): RequireStaff) -> impl IntoResponse {
///     format!("Welcome back, {}", staff.email)
/// }
/// ```
pub struct RequireStaff(pub CurrentUser);

/// Why a request was refused by [`RequireStaff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffRejection {
    /// Send the browser to the login page, then back to `next`.
    RedirectToLogin {
        /// Path (and query) the visitor was trying to reach.
        next: String,
    },
    /// API request without a logged-in user.
    Unauthorized,
    /// API request from a logged-in user who is not active staff.
    Forbidden,
    /// The account could not be loaded.
    Internal,
}

impl IntoResponse for StaffRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => Redirect::to(&login_redirect(&next)).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "Only staff members can access this resource",
            )
                .into_response(),
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Login URL that returns to `next` after a successful login.
#[must_use]
pub fn login_redirect(next: &str) -> String {
    format!("{LOGIN_URL}?next={}", urlencoding::encode(next))
}

/// Decide whether `user` may reach `path_and_query`.
///
/// Browser requests are redirected to the login page whether the visitor
/// is anonymous or simply not staff, so a staff member can switch
/// accounts. Requests under `/api/` get a status code instead.
///
/// # Errors
///
/// Returns the [`StaffRejection`] to respond with.
pub fn check_staff_access(
    user: Option<&CurrentUser>,
    path_and_query: &str,
) -> Result<(), StaffRejection> {
    let is_api = path_and_query.starts_with("/api/");

    match user {
        Some(user) if user.is_active && user.is_staff => Ok(()),
        Some(_) if is_api => Err(StaffRejection::Forbidden),
        None if is_api => Err(StaffRejection::Unauthorized),
        _ => Err(StaffRejection::RedirectToLogin {
            next: path_and_query.to_owned(),
        }),
    }
}

/// Reload the session's account so removed or deactivated staff lose access
/// immediately. A deleted account counts as logged out.
async fn load_current_user(
    pool: &PgPool,
    id: UserId,
) -> Result<Option<CurrentUser>, StaffRejection> {
    match UserRepository::new(pool).get_by_id(id).await {
        Ok(user) => Ok(user.as_ref().map(CurrentUser::from)),
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(
                error = %e,
                user_id = %id,
                sentry_event_id = %event_id,
                "Failed to load session user"
            );
            Err(StaffRejection::Internal)
        }
    }
}

impl<S> FromRequestParts<S> for RequireStaff
where
    PgPool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StaffRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path_and_query = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path(), |pq| pq.as_str())
            .to_owned();

        let session_user: Option<CurrentUser> = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        let user = match session_user {
            Some(cached) => load_current_user(&PgPool::from_ref(state), cached.id).await?,
            None => None,
        };

        check_staff_access(user.as_ref(), &path_and_query)?;

        // check_staff_access only passes with a user present
        user.map(Self).ok_or(StaffRejection::Unauthorized)
    }
}

/// Store the logged-in user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the logged-in user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Request, header};
    use greenleaf_core::{Email, UserId};
    use tower_sessions::MemoryStore;

    use super::*;

    fn current_user(is_staff: bool, is_active: bool) -> CurrentUser {
        CurrentUser {
            id: UserId::new(5),
            email: Email::parse("staff@example.com").unwrap(),
            is_staff,
            is_active,
        }
    }

    fn request_parts(uri: &str, session: Option<Session>) -> Parts {
        let (mut parts, ()) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        if let Some(session) = session {
            parts.extensions.insert(session);
        }
        parts
    }

    #[test]
    fn test_active_staff_passes() {
        assert_eq!(check_staff_access(Some(&current_user(true, true)), "/dashboard/"), Ok(()));
        assert_eq!(check_staff_access(Some(&current_user(true, true)), "/api/staff"), Ok(()));
    }

    #[test]
    fn test_browser_requests_redirect_with_next() {
        let expected = Err(StaffRejection::RedirectToLogin {
            next: "/dashboard/orders?page=2".to_owned(),
        });
        assert_eq!(check_staff_access(None, "/dashboard/orders?page=2"), expected);
        assert_eq!(
            check_staff_access(Some(&current_user(false, true)), "/dashboard/orders?page=2"),
            expected
        );
        assert_eq!(
            check_staff_access(Some(&current_user(true, false)), "/dashboard/orders?page=2"),
            expected
        );
    }

    #[test]
    fn test_api_requests_get_status_codes() {
        assert_eq!(check_staff_access(None, "/api/staff"), Err(StaffRejection::Unauthorized));
        assert_eq!(
            check_staff_access(Some(&current_user(false, true)), "/api/staff"),
            Err(StaffRejection::Forbidden)
        );
    }

    #[test]
    fn test_login_redirect_encodes_next() {
        assert_eq!(
            login_redirect("/dashboard/orders?page=2"),
            "/account/login/?next=%2Fdashboard%2Forders%3Fpage%3D2"
        );
    }

    #[test]
    fn test_rejection_responses() {
        let response = StaffRejection::RedirectToLogin {
            next: "/dashboard/".to_owned(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/account/login/?next=%2Fdashboard%2F"
        );

        assert_eq!(
            StaffRejection::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            StaffRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            StaffRejection::Internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    fn lazy_pool() -> PgPool {
        // Never connected: none of these requests carry a session user.
        PgPool::connect_lazy("postgres://localhost/unused").unwrap()
    }

    #[tokio::test]
    async fn test_extractor_with_empty_session() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        set_current_user(&session, &current_user(true, true)).await.unwrap();
        clear_current_user(&session).await.unwrap();

        let mut parts = request_parts("/dashboard/", Some(session));
        assert!(matches!(
            RequireStaff::from_request_parts(&mut parts, &lazy_pool()).await,
            Err(StaffRejection::RedirectToLogin { .. })
        ));
    }

    #[tokio::test]
    async fn test_guarded_route() {
        use axum::{Router, body::Body, routing::get};
        use tower::ServiceExt;

        async fn dashboard(RequireStaff(staff): RequireStaff) -> String {
            staff.email.to_string()
        }

        let app = Router::new()
            .route("/dashboard/", get(dashboard))
            .with_state(lazy_pool());
        let response = app
            .oneshot(Request::builder().uri("/dashboard/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/account/login/?next=%2Fdashboard%2F"
        );
    }

    #[tokio::test]
    async fn test_extractor_without_session_layer() {
        let mut parts = request_parts("/api/staff", None);
        assert!(matches!(
            RequireStaff::from_request_parts(&mut parts, &lazy_pool()).await,
            Err(StaffRejection::Unauthorized)
        ));
    }
}
