pub mod allocations;
pub mod catalog;
pub mod reports;
pub mod service_environments;

pub use allocations::AllocationsDao;
pub use catalog::CatalogDao;
pub use reports::{ReportsDao, UsageFilter};
pub use service_environments::ServiceEnvironmentsDao;
