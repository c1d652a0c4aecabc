use super::TaskRemote;
use super::error::RemoteError;

/// Check credentials against the service.
///
/// Blank fields fail locally without touching the network. Nothing is kept on
/// success: the caller owns the session flag.
pub async fn authenticate<R: TaskRemote>(
    remote: &R,
    username: &str,
    password: &str,
) -> Result<(), RemoteError> {
    if username.trim().is_empty() || password.trim().is_empty() {
        return Err(RemoteError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    remote.login(username, password).await?;
    log::info!("Logged in as {}", username);
    Ok(())
}
