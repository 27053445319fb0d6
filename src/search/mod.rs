//! Search Module
//!
//! Paginated searches against the Elsevier search indexes
//! (`https://api.elsevier.com/content/search/<index>`):
//! - [`SearchRequest`]: the immutable query + index pair and its request URI
//! - [`PaginatedSearch`]: executes a request, follows `next` links up to
//!   [`MAX_RETRIEVABLE_RESULTS`], and builds a typed [`ResultsTable`](crate::table::ResultsTable)

pub mod paginated;
pub mod request;

pub use paginated::{PaginatedSearch, MAX_RETRIEVABLE_RESULTS};
pub use request::{SearchRequest, DEFAULT_BASE_URL};
