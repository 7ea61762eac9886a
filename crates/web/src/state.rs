//! Shared application state.

use crate::page::PageRenderer;
use krepo_core::AppResult;
use krepo_knowledge::{LawCatalog, QueryRouter};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<QueryRouter>,
    pub laws: Arc<LawCatalog>,
    pub page: Arc<PageRenderer>,
    in_flight: Arc<Semaphore>,
}

impl AppState {
    pub fn new(router: QueryRouter, laws: LawCatalog) -> AppResult<Self> {
        Ok(Self {
            router: Arc::new(router),
            laws: Arc::new(laws),
            page: Arc::new(PageRenderer::new()?),
            in_flight: Arc::new(Semaphore::new(1)),
        })
    }

    /// Claim the single question slot, or `None` while one is being answered.
    pub fn try_begin_question(&self) -> Option<OwnedSemaphorePermit> {
        self.in_flight.clone().try_acquire_owned().ok()
    }
}
