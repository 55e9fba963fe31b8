pub mod animal;
pub mod category;
pub mod species;
pub mod user;

pub use animal::{Animal, AnimalView};
pub use category::Category;
pub use species::{Species, SpeciesView};
pub use user::{PublicUser, User};
