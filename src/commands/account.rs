//! Account commands: login, register, logout, whoami.

use super::{CommandError, Context};
use crate::api::{Credentials, NewUser, User};
use crate::auth::BearerToken;
use crate::display;

#[derive(Debug, Clone)]
pub struct LoginArgs {
    pub email: String,
    pub password: String,
    /// Token to store when the service does not return one.
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegisterArgs {
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub password: String,
}

/// Log in and persist the bearer token.
///
/// # Errors
///
/// Returns the request failure, or `CommandError::Invalid` when neither the
/// service nor the caller provides a token.
pub async fn login(ctx: &Context, args: LoginArgs) -> Result<User, CommandError> {
    let client = ctx.anonymous_client()?;
    let response = client
        .login(&Credentials {
            email: args.email,
            password: args.password,
        })
        .await?;

    let token = response
        .access_token
        .or(args.token)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            CommandError::Invalid(
                "Login succeeded but no token was issued; pass one with --token".to_string(),
            )
        })?;
    ctx.store.save(&BearerToken::new(token))?;

    tracing::info!(user_id = response.user.id, "Logged in");
    display::print_user(&response.user);
    display::print_success("Logged in");
    Ok(response.user)
}

/// Create an account.
///
/// # Errors
///
/// Returns the request failure.
pub async fn register(ctx: &Context, args: RegisterArgs) -> Result<User, CommandError> {
    let client = ctx.anonymous_client()?;
    let user = client
        .register(&NewUser {
            email: args.email,
            first_name: args.first_name,
            last_name: args.last_name.filter(|n| !n.trim().is_empty()),
            password: args.password,
        })
        .await?;

    display::print_user(&user);
    display::print_success("Account created, you can now log in");
    Ok(user)
}

/// Forget the stored token.
///
/// # Errors
///
/// Returns an error if the storage file cannot be rewritten.
pub fn logout(ctx: &Context) -> Result<(), CommandError> {
    ctx.store.clear()?;
    display::print_success("Logged out");
    Ok(())
}

/// Show the user behind the stored token.
///
/// # Errors
///
/// Returns an error if no token is stored or the service rejects it.
pub async fn whoami(ctx: &Context) -> Result<User, CommandError> {
    let user = ctx
        .client()?
        .current_user()
        .await
        .map_err(CommandError::from_identity_check)?;
    display::print_user(&user);
    Ok(user)
}
