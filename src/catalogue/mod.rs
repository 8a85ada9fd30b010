mod core;
mod types;

pub use self::core::{Catalogue, DEFAULT_ERROR_MESSAGE, DEFAULT_SUCCESS_MESSAGE, split_name};
pub use types::{CatalogueFile, MessageKind, Messages, QueryMapping};
