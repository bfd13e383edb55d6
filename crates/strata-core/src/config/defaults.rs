// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "strata.db";
pub const DEFAULT_WAL_MODE: bool = true;
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

// --- Hierarchy ---
pub const DEFAULT_MAX_TRAVERSAL_DEPTH: usize = 10;
pub const DEFAULT_ROLE_CACHE_SIZE: u64 = 1_024;
pub const DEFAULT_ROLE_CACHE_TTL_SECS: u64 = 300;

// --- Routing ---
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_CUSTOM_RULE_CONFIDENCE: f64 = 0.95;
pub const DEFAULT_INBOX_CONFIDENCE: f64 = 0.9;
pub const DEFAULT_SIMILARITY_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_SIMILARITY_TOP_K: usize = 5;
pub const DEFAULT_QUICK_TASK_MAX_HOURS: f64 = 0.1;
pub const DEFAULT_SHORT_TASK_MAX_HOURS: f64 = 0.5;
pub const DEFAULT_LONG_TASK_MIN_HOURS: f64 = 4.0;
pub const DEFAULT_URGENT_THRESHOLD: f64 = 0.7;
pub const DEFAULT_HIGH_VALUE_DEAL: f64 = 50_000.0;
pub const DEFAULT_DEAL_CLOSE_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_DEAL_HIGH_PROBABILITY: f64 = 0.7;

/// Urgency keywords and their weights. Alarm words outweigh schedule words.
pub const DEFAULT_URGENCY_KEYWORDS: &[(&str, f64)] = &[
    ("urgent", 0.5),
    ("asap", 0.5),
    ("critical", 0.5),
    ("emergency", 0.5),
    ("immediately", 0.4),
    ("today", 0.3),
    ("important", 0.2),
    ("deadline", 0.2),
    ("priority", 0.2),
    ("soon", 0.1),
];

// --- Embeddings ---
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "tfidf";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 256;
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 50;
pub const DEFAULT_L1_CACHE_SIZE: u64 = 10_000;
pub const DEFAULT_EMBEDDING_WORKERS: usize = 2;
pub const DEFAULT_EMBEDDING_MAX_PENDING: usize = 16;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
