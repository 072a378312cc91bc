//! Request builders: one normalized row in, one request payload or a
//! validation failure out. Builders never touch the network.

pub mod fields;
pub mod freight;
pub mod procurement;
pub mod search;
pub mod suggest;

pub use freight::build_freight;
pub use procurement::{build_procurement_item, into_batches, ActivityReference, Batch};
pub use search::build_search_query;
pub use suggest::build_suggest;
