//! Business logic services

pub mod activity;
pub mod catalog;

use std::sync::Arc;

use crate::repository::Repository;

use self::activity::ActivityLog;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
}

impl Services {
    /// Create all services with the given repository and activity sink
    pub fn new(repository: Repository, activity: Arc<dyn ActivityLog>) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository, activity),
        }
    }
}
