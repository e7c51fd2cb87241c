pub mod catalog;
pub mod history;
pub mod recommendations;
pub mod retry;

pub use catalog::{ArticleCatalog, CatalogQuery, PgCatalog};
pub use history::{Clock, ReadingHistory, SystemClock};
pub use retry::RetryPolicy;
