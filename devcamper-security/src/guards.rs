use devcamper_core::AppError;

/// An authenticated identity that carries one role.
pub trait RoleBasedIdentity {
    fn role(&self) -> &str;
}

/// Allow the request when the identity's role is one of `allowed`, else 403.
pub fn authorize<I: RoleBasedIdentity + ?Sized>(identity: &I, allowed: &[&str]) -> Result<(), AppError> {
    let role = identity.role();
    if allowed.contains(&role) {
        Ok(())
    } else {
        tracing::debug!(role, ?allowed, "role rejected");
        Err(AppError::Forbidden(format!(
            "User role {role} is not authorized to access this route"
        )))
    }
}
