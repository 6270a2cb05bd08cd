pub mod draft;
pub mod listing;
pub mod menu;

pub use draft::{CatalogError, FoodDraft, FoodPatch};
pub use listing::{FoodFilter, Page};
pub use menu::{Menu, MenuSection};
