/// Strata system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hard ceiling for any hierarchy traversal, regardless of the requested depth.
pub const MAX_TRAVERSAL_DEPTH: usize = 50;

/// Maximum batch size for bulk status updates and batch routing.
pub const MAX_BULK_BATCH_SIZE: usize = 1000;

/// Actor recorded for mutations made by the system itself (router, rule actions).
pub const SYSTEM_ACTOR: &str = "system";

/// Breadcrumb separator used by `get_path`.
pub const BREADCRUMB_SEPARATOR: &str = " / ";
