/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: Session token issue and validation
/// - [`middleware`]: Bearer token middleware and [`middleware::AuthContext`]
/// - [`authorization`]: Project and task access rules
///
/// # Example
///
/// ```no_run
/// use projecthub_shared::auth::jwt::{create_token, Claims};
/// use projecthub_shared::auth::password::{hash_password, verify_password};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = create_token(&Claims::new(Uuid::new_v4(), "alice"), "secret-key-of-at-least-32-chars!!")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
