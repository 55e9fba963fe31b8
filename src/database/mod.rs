pub mod filter;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod store;

pub use filter::{Condition, Filter};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{Model, Repository};
pub use store::{Collection, Document, Store, StoreError};
