use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::models::{Animal, Category, Species, User};
use crate::database::{Repository, Store};
use crate::enrichment::ImageLookup;

/// Shared by every handler and pipeline stage.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub images: Arc<dyn ImageLookup>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>, images: Arc<dyn ImageLookup>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            images,
        }
    }

    pub fn categories(&self) -> Repository<Category> {
        Repository::new(self.store.clone())
    }

    pub fn species(&self) -> Repository<Species> {
        Repository::new(self.store.clone())
    }

    pub fn animals(&self) -> Repository<Animal> {
        Repository::new(self.store.clone())
    }

    pub fn users(&self) -> Repository<User> {
        Repository::new(self.store.clone())
    }
}
