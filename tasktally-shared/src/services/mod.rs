/// Core operations
///
/// Each function takes the pool plus, where access matters, the acting
/// user's [`AuthContext`](crate::auth::context::AuthContext). Writes run in a
/// single transaction; rule checks happen before protected rows are touched.
///
/// # Modules
///
/// - `accounting`: points computation, completions, daily totals
/// - `instantiation`: idempotent per-day instance creation
/// - `accounts`: login, tokens, bootstrap admin
/// - `directory`: groups and user accounts
/// - `tasks`: task catalogue and the daily board

pub mod accounting;
pub mod accounts;
pub mod directory;
pub mod instantiation;
pub mod tasks;
