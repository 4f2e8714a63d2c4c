//! # incubator-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `TelemetrySink` and `ProfileSource` ports defined in
//!   `incubator-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (sqlx embedded migrations, which also seed the
//!   reference egg profiles)
//!
//! ## Dependency rule
//! Depends on `incubator-app` (for port traits) and `incubator-domain` (for
//! domain types). The `app` and `domain` crates must never reference this
//! adapter.

pub mod error;
pub mod pool;
pub mod profile_repo;
pub mod telemetry_sink;

pub use pool::{Config, Database};
pub use profile_repo::SqliteProfileRepository;
pub use telemetry_sink::SqliteTelemetrySink;
