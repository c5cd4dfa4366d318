#![allow(dead_code)]

use axum::extract::ConnectInfo;
use linkgate::application::services::{AdmissionController, LinkService};
use linkgate::domain::entities::{RouteLimitPolicy, RoutePolicies};
use linkgate::infrastructure::persistence::InMemorySlugRepository;
use linkgate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::Layer;

pub const BASE_URL: &str = "https://s.example.com";

pub fn create_test_state(repo: Arc<InMemorySlugRepository>) -> AppState {
    create_test_state_with_policies(repo, RoutePolicies::default())
}

pub fn create_test_state_with_policies(
    repo: Arc<InMemorySlugRepository>,
    policies: RoutePolicies,
) -> AppState {
    let admission = Arc::new(AdmissionController::new(policies));
    let link_service = Arc::new(LinkService::new(repo, 100, BASE_URL.to_string()));
    AppState::new(admission, link_service)
}

pub fn tight_policies(limit: u32) -> RoutePolicies {
    RoutePolicies::new(RouteLimitPolicy::per_seconds(limit, 60))
}

/// Injects a fixed peer address, standing in for `into_make_service_with_connect_info`.
#[derive(Clone)]
pub struct MockConnectInfoLayer(pub &'static str);

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService {
            inner,
            addr: self.0,
        }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
    addr: &'static str,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = self.addr.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
