use crate::error::AppError;
use crate::utils::secret::constant_time_eq;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// State that can hand out the single shared admin password.
pub trait SharedSecretStore: Clone + Send + Sync + 'static {
    fn shared_secret(&self) -> &str;
}

/// Reject requests whose `x-admin-password` header does not match the
/// configured shared secret.
pub async fn shared_secret_middleware<S>(
    State(state): State<S>,
    req: Request,
    next: Next,
) -> Result<Response, AppError>
where
    S: SharedSecretStore,
{
    let supplied = req
        .headers()
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok());

    match supplied {
        Some(password) if constant_time_eq(password, state.shared_secret()) => {
            Ok(next.run(req).await)
        }
        Some(_) => {
            tracing::warn!(path = %req.uri().path(), "Failed admin authentication attempt");
            Err(AppError::Unauthorized(anyhow::anyhow!("Incorrect password")))
        }
        None => Err(AppError::Unauthorized(anyhow::anyhow!(
            "Missing {} header",
            ADMIN_PASSWORD_HEADER
        ))),
    }
}
