// Elsevier Search - paginated search client for the Elsevier search APIs

pub mod client;
pub mod config;
pub mod search;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use client::{ApiClient, ElsevierClient};
pub use config::Config;
pub use search::{PaginatedSearch, SearchRequest};
pub use table::{Cell, ResultsTable};
pub use types::{ExecutionError, SearchError, SearchResult};
