/// Database models for TaskTally
///
/// Each model owns its SQL. Functions that may run inside a transaction take
/// any `sqlx::Executor` so callers can pass either `&SqlitePool` or
/// `&mut *tx`.
///
/// # Models
///
/// - `user`: accounts, roles and group membership
/// - `group`: named sets of users
/// - `task`: reusable task definitions with a point rate
/// - `task_instance`: one day's occurrence of a task
///
/// # Example
///
/// ```no_run
/// use tasktally_shared::models::group::Group;
/// use tasktally_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::in_memory()).await?;
/// let group = Group::create(&pool, "Readers").await?;
/// # Ok(())
/// # }
/// ```

pub mod group;
pub mod task;
pub mod task_instance;
pub mod user;
