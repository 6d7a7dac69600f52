// Library surface shared by the CLI and integration tests.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod history;
pub mod language;
pub mod results;
pub mod store;
pub mod streak;
pub mod summary;

pub use error::{IngestError, StoreError, ValidationError};
pub use language::{Language, WordLists, WordSampler};
pub use results::{ingest, ResultPayload, TestResult, UserId};
pub use store::{InMemoryResultStore, ResultStore, SqliteResultStore};
pub use streak::{compute_streaks, Clock, FixedClock, Streaks, SystemClock};
pub use summary::{StatsEngine, UserSummary};
