//! Business logic services

pub mod accounts;
pub mod catalog;
pub mod diagnostics;
pub mod loans;

use std::time::Duration;

use crate::{config::CirculationConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub accounts: accounts::AccountsService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub diagnostics: diagnostics::DiagnosticsService,
}

impl Services {
    /// Create all services sharing the given repository
    pub fn new(repository: Repository, circulation: &CirculationConfig) -> Self {
        let default_wait = circulation.borrow_wait_timeout_secs.map(Duration::from_secs);
        Self {
            accounts: accounts::AccountsService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), default_wait),
            diagnostics: diagnostics::DiagnosticsService::new(repository),
        }
    }
}
