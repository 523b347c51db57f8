/// Database models for Hearth
///
/// One submodule per table, each exposing one function per query pattern.
/// Functions borrow a connection from the pool for the duration of the call.
///
/// # Models
///
/// - `user`: Accounts, looked up by email after authentication
/// - `house`: Houses and house-name normalization
/// - `membership`: The `user_houses` join table, including leaving with
///   last-member cleanup
/// - `task`: Chores with assignee and due date
/// - `restriction`: Dietary and schedule restrictions
///
/// # Example
///
/// ```no_run
/// use hearth_shared::models::{house::House, user::{CreateUser, User}};
/// use hearth_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let alice = User::create(&pool, CreateUser {
///     username: "alice".to_string(),
///     email: "alice@x.com".to_string(),
/// }).await?;
///
/// let house = House::create(&pool, "Maple St", alice.id).await?;
/// # Ok(())
/// # }
/// ```

pub mod house;
pub mod membership;
pub mod restriction;
pub mod task;
pub mod user;
