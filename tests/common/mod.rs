#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;

use zoo_api::auth::{generate_jwt, hash_password, Principal};
use zoo_api::config::AppConfig;
use zoo_api::database::models::{Animal, Category, Species, User};
use zoo_api::database::MemoryStore;
use zoo_api::enrichment::{EnrichmentError, ImageLookup};
use zoo_api::geo::Point;
use zoo_api::state::AppState;
use zoo_api::types::{Gender, ObjectId, Role};

pub const SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "hunter22";

/// Stands in for Wikipedia: a predictable URL per title, or a failure.
#[derive(Default)]
pub struct StubImages {
    pub fail: bool,
}

pub fn image_url(title: &str) -> String {
    format!("https://upload.wikimedia.org/thumb/{}.jpg", title.replace(' ', "_"))
}

#[async_trait]
impl ImageLookup for StubImages {
    async fn thumbnail(&self, title: &str) -> Result<String, EnrichmentError> {
        if self.fail {
            return Err(EnrichmentError::Status(503));
        }
        Ok(image_url(title))
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = Some(SECRET.to_string());
    config.security.bcrypt_cost = 4;
    config
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(test_config(), StubImages::default())
    }

    pub fn with_failing_images() -> Self {
        Self::build(test_config(), StubImages { fail: true })
    }

    pub fn without_secret() -> Self {
        let mut config = test_config();
        config.security.jwt_secret = None;
        Self::build(config, StubImages::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::build(config, StubImages::default())
    }

    fn build(config: AppConfig, images: StubImages) -> Self {
        let state = AppState::new(config, Arc::new(MemoryStore::new()), Arc::new(images));
        let router = zoo_api::app(state.clone());
        Self { state, router }
    }

    /// Send one request through the full router. An empty body decodes as `Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, json))
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, None, None).await
    }

    pub fn token_for(&self, user: &User) -> String {
        generate_jwt(&self.state.config.security, Principal::from(user)).expect("token")
    }

    /// A stored user with password [`PASSWORD`] and a token for it.
    pub async fn seed_user(&self, user_name: &str, role: Role) -> Result<(User, String)> {
        let user = self
            .state
            .users()
            .create(User {
                id: ObjectId::new(),
                user_name: user_name.to_string(),
                email: format!("{}@zoo.test", user_name),
                password: hash_password(PASSWORD, 4)?,
                role,
            })
            .await?;
        let token = self.token_for(&user);
        Ok((user, token))
    }

    pub async fn seed_category(&self, name: &str) -> Result<Category> {
        Ok(self
            .state
            .categories()
            .create(Category {
                id: ObjectId::new(),
                category_name: name.to_string(),
            })
            .await?)
    }

    pub async fn seed_species(&self, name: &str, category: &Category, lon: f64, lat: f64) -> Result<Species> {
        Ok(self
            .state
            .species()
            .create(Species {
                id: ObjectId::new(),
                species_name: name.to_string(),
                category: category.id,
                image: image_url(name),
                location: Point::new(lon, lat),
            })
            .await?)
    }

    pub async fn seed_animal(&self, name: &str, species: &Species, owner: &User) -> Result<Animal> {
        Ok(self
            .state
            .animals()
            .create(Animal {
                id: ObjectId::new(),
                animal_name: Some(name.to_string()),
                species: species.id,
                birthdate: NaiveDate::from_ymd_opt(2019, 4, 12).expect("date"),
                gender: Gender::Female,
                owner: owner.id,
            })
            .await?)
    }
}
