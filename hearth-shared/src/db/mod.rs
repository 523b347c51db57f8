/// Database layer for Hearth
///
/// This module provides connection pooling and schema migrations.
///
/// # Modules
///
/// - `pool`: Bounded PostgreSQL connection pool with health checks
/// - `migrations`: Schema migration runner
/// - Models live in the `models` module at crate root level
///
/// # Example
///
/// ```no_run
/// use hearth_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
