//! Per-route admission middleware.

use axum::{
    Router,
    extract::{ConnectInfo, Request, State},
    middleware::{self, Next},
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::application::services::{AdmissionController, Decision};
use crate::error::AppError;
use crate::utils::client_key::client_key;

/// Binds a route key to the shared admission controller.
///
/// # Example
///
/// ```rust,ignore
/// let login = RouteGuard::new(state.admission.clone(), route_policy::LOGIN)
///     .apply(Router::new().route("/auth/login", post(login_handler)));
/// ```
#[derive(Clone)]
pub struct RouteGuard {
    admission: Arc<AdmissionController>,
    route: &'static str,
}

impl RouteGuard {
    pub fn new(admission: Arc<AdmissionController>, route: &'static str) -> Self {
        Self { admission, route }
    }

    pub fn route(&self) -> &'static str {
        self.route
    }

    /// Guards every route currently in `router`.
    pub fn apply<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.route_layer(middleware::from_fn_with_state(self, layer))
    }
}

/// Admits or rejects a request before it reaches the handler.
///
/// The client is identified by [`client_key`]; the peer address comes from
/// [`ConnectInfo`] when the server was started with it.
///
/// # Errors
///
/// Returns `429 Too Many Requests` with a `Retry-After` header and the wait in
/// the body when the client's window for this route is exhausted.
pub async fn layer(
    State(guard): State<RouteGuard>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(req.headers(), peer);

    let decision = guard
        .admission
        .check_and_record(&client, guard.route, Instant::now());

    let outcome = if decision.is_allowed() { "allow" } else { "deny" };
    metrics::counter!("admission_decisions_total", "route" => guard.route, "decision" => outcome)
        .increment(1);

    if let Decision::Deny { retry_after_secs } = decision {
        tracing::warn!(client = %client, route = guard.route, retry_after_secs, "Rate limit exceeded");
    }

    decision.into_result()?;

    Ok(next.run(req).await)
}
