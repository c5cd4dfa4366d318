//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::application::services::{AdmissionController, LinkService};

/// State cloned into every request.
///
/// The [`AdmissionController`] is created once at startup and shared here;
/// nothing reaches it through a global.
#[derive(Clone)]
pub struct AppState {
    pub admission: Arc<AdmissionController>,
    pub link_service: Arc<LinkService>,
}

impl AppState {
    pub fn new(admission: Arc<AdmissionController>, link_service: Arc<LinkService>) -> Self {
        Self {
            admission,
            link_service,
        }
    }
}
