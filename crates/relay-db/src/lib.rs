//! # relay-db
//!
//! Persistence layer implementing the `relay-core` store traits.
//!
//! ## Overview
//!
//! - PostgreSQL via SQLx: connection pool, row models, mappers, and
//!   `PgMessageStore` / `PgUserDirectory`
//! - `MemoryMessageStore`: a process-local store for development and tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_db::{create_pool, ensure_schema, PgMessageStore, PoolConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::from_env()).await?;
//!     ensure_schema(&pool).await?;
//!     let store = PgMessageStore::new(pool, Default::default());
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryMessageStore;
pub use pool::{create_pool, create_pool_from_env, ensure_schema, PgPool, PoolConfig};
pub use repositories::{PgMessageStore, PgUserDirectory};
