//! Route-level pipeline stages. Routes compose them with `ServiceBuilder`
//! in the order authenticate, enrich, gate; any stage can short-circuit with
//! an `ApiError`.

pub mod auth;
pub mod enrich;
pub mod gate;
pub mod payload;
pub mod report;

pub use auth::authenticate;
pub use enrich::species_image;
pub use gate::gate;
pub use payload::{BodyLimit, Payload};
pub use report::report_errors;
