//! The tabular data engine.
//!
//! Everything under this module is pure and synchronous: a loaded [`Table`] is never
//! mutated, and the filtered/sorted/paginated views are computed as index sequences
//! into it.

pub mod compare;
pub mod explorer;
pub mod export;
pub mod filter;
pub mod paginate;
pub mod sort;
pub mod table;

pub use explorer::Explorer;
pub use export::{ExportFormat, ExportPayload};
pub use paginate::{PageInfo, PageSize, PageState};
pub use sort::{SortDirection, SortState};
pub use table::{Row, Table};

/// Row count above which filtering and sorting fan out over rayon
pub(crate) const PARALLEL_THRESHOLD: usize = 10_000;
