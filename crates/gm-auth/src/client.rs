//! Login and registration against the storefront API.

use crate::{
    AdminCredentials, AuthError, AuthToken, Credentials, Registration, Session, UserProfile,
};
use gm_data::{FetchClient, Response};
use serde::Deserialize;

#[derive(Deserialize)]
struct ShopperLogin {
    token: String,
    user: UserProfile,
}

#[derive(Deserialize)]
struct AdminLogin {
    access_token: String,
}

/// Talks to the auth endpoints and records the result in a [`Session`].
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: FetchClient,
    session: Session,
}

impl AuthClient {
    pub fn new(http: FetchClient, session: Session) -> Self {
        Self { http, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Sign a shopper in and persist the token and profile.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, AuthError> {
        credentials.validate()?;
        let response = self
            .http
            .post("/auth/login")
            .json(credentials)?
            .send()
            .await?;
        let body: ShopperLogin = check(response)?.json()?;
        let token = AuthToken::new(body.token).ok_or(AuthError::InvalidToken)?;
        self.session.sign_in(body.user.clone(), token)?;
        Ok(body.user)
    }

    /// Sign an admin in and persist the token.
    pub async fn login_admin(&self, credentials: &AdminCredentials) -> Result<(), AuthError> {
        credentials.validate()?;
        let response = self
            .http
            .post("/admin/auth/login")
            .json(credentials)?
            .send()
            .await?;
        let body: AdminLogin = check(response)?.json()?;
        let token = AuthToken::new(body.access_token).ok_or(AuthError::InvalidToken)?;
        self.session.sign_in_admin(token)
    }

    /// Create a shopper account. Does not sign in.
    pub async fn register(&self, registration: &Registration) -> Result<(), AuthError> {
        registration.validate()?;
        let response = self
            .http
            .post("/auth/register")
            .json(registration)?
            .send()
            .await?;
        if response.is_client_error() && response.status != 401 {
            return Err(AuthError::Rejected(response.error_message()));
        }
        check(response)?;
        Ok(())
    }

    /// Sign the shopper out locally.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.session.teardown()
    }
}

fn check(response: Response) -> Result<Response, AuthError> {
    if response.status == 401 {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(response.error_for_status()?)
}
