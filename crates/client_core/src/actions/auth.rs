use serde_json::json;
use shared::{
    domain::User,
    error::ApiFailure,
    protocol::{AccessToken, NewUser, RegisteredUser},
};
use tracing::{info, warn};

use super::MarketplaceClient;
use crate::{
    credentials::{CredentialStore, ACCESS_TOKEN_KEY},
    events::{Operation, Payload, StoreEvent},
    pipeline::{Outcome, RequestDescriptor},
};

fn persist_token(
    credentials: &dyn CredentialStore,
    token: &str,
    status: u16,
) -> Result<(), ApiFailure> {
    credentials
        .save(ACCESS_TOKEN_KEY, token)
        .map_err(|e| ApiFailure::credentials(Some(status), format!("{e:#}")))
}

impl MarketplaceClient {
    /// Exchanges credentials for a token, stores it, then loads the user.
    pub async fn login(&self, email: &str, password: &str) -> Outcome<User> {
        let credentials = self.credentials.clone();
        let descriptor =
            RequestDescriptor::<AccessToken>::post(Operation::Login, "/users/login/token/")
                .form(vec![
                    ("username".to_string(), email.to_string()),
                    ("password".to_string(), password.to_string()),
                ])
                .on_success(move |response| {
                    persist_token(credentials.as_ref(), &response.data.access_token, response.status)?;
                    Ok(Payload::AccessToken(response.data.clone()))
                });

        match self.pipeline.run(descriptor).await {
            Outcome::Success { .. } => self.fetch_user_from_token().await,
            Outcome::Failure { status, error } => Outcome::Failure { status, error },
        }
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Outcome<User> {
        let new_user = NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let credentials = self.credentials.clone();
        let descriptor = RequestDescriptor::<RegisteredUser>::post(Operation::Register, "/users/")
            .json(json!({ "new_user": new_user }))
            .on_success(move |response| {
                persist_token(
                    credentials.as_ref(),
                    &response.data.access_token.access_token,
                    response.status,
                )?;
                Ok(Payload::User(response.data.user.clone()))
            });

        match self.pipeline.run(descriptor).await {
            Outcome::Success { data, .. } => {
                info!(user_id = %data.user.id, "auth: registered new user");
                self.fetch_user_from_token().await
            }
            Outcome::Failure { status, error } => Outcome::Failure { status, error },
        }
    }

    pub async fn fetch_user_from_token(&self) -> Outcome<User> {
        self.pipeline
            .run(RequestDescriptor::<User>::get(
                Operation::FetchUserFromToken,
                "/users/me/",
            ))
            .await
    }

    /// Startup hook: only asks the server when a token was persisted earlier.
    pub async fn restore_session(&self) -> Option<Outcome<User>> {
        self.credentials.access_token()?;
        Some(self.fetch_user_from_token().await)
    }

    pub fn log_user_out(&self) -> anyhow::Result<()> {
        let removed = self.credentials.remove(ACCESS_TOKEN_KEY);
        if let Err(err) = &removed {
            warn!("auth: failed to remove stored token: {err:#}");
        }
        self.store().dispatch(StoreEvent::LogUserOut);
        removed
    }
}
