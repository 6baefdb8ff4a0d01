//! Repository index loading.
//!
//! An index is a JSON file listing resources with their capabilities and
//! requirements (see [`model`]). Each `<name>.index.json` file becomes one
//! [`IndexedRepository`](wirepick_domain::IndexedRepository) named `<name>`.

mod convert;
mod load;
pub mod model;

pub use convert::{IndexError, to_resources};
pub use load::{
    INDEX_SUFFIX, IndexLoadError, LoadedIndex, load_index, load_repositories, parse_index,
    repository_name,
};
