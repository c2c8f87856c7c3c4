//! Authentication state trait and macro.

use crate::jwt::JwtConfig;

/// Trait for state types that can verify and issue session tokens.
pub trait HasAuthBackend {
    fn jwt(&self) -> &JwtConfig;
    /// Whether session cookies get the `Secure` / `SameSite=None` attributes.
    fn secure_cookies(&self) -> bool;
}

/// Macro to implement `HasAuthBackend` for state structs with the standard fields.
///
/// The struct must have these fields:
/// - `jwt: Arc<JwtConfig>`
/// - `secure_cookies: bool`
///
/// # Example
/// ```ignore
/// use crate::impl_has_auth_backend;
///
/// #[derive(Clone)]
/// pub struct MyState {
///     pub db: Database,
///     pub jwt: Arc<JwtConfig>,
///     pub secure_cookies: bool,
/// }
///
/// impl_has_auth_backend!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn jwt(&self) -> &$crate::jwt::JwtConfig {
                &self.jwt
            }
            fn secure_cookies(&self) -> bool {
                self.secure_cookies
            }
        }
    };
}
