pub mod embedding;
pub mod executor;
pub mod storage;

pub use embedding::IEmbeddingProvider;
pub use executor::{ActionExecutor, NotificationSink};
pub use storage::{IGraphStorage, IPlacementStorage, IRoutingLog, IRuleStorage, IVectorIndexStorage};
