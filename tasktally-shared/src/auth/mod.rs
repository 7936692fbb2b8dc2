/// Authentication and authorization
///
/// # Modules
///
/// - `password`: Argon2id hashing and constant-time verification
/// - `jwt`: access tokens handed out at login
/// - `context`: the request-scoped identity passed into core operations
/// - `authorization`: role and group visibility rules
///
/// # Example
///
/// ```
/// use tasktally_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("admin123")?;
/// assert!(verify_password("admin123", &hash)?);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod context;
pub mod jwt;
pub mod password;
