//! Session store: who is signed in, and the token the API client carries.

use connect_common::models::{AuthResponse, LoginRequest, RegisterForm, User, UserEnvelope};
use connect_common::{ApiClient, ApiError, Empty, Result};
use parking_lot::RwLock;
use reqwest::Method;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::notify::NotificationCenter;
use crate::sequence::{RequestSequencer, Resource};

pub struct SessionStore {
    api: ApiClient,
    notifier: Arc<NotificationCenter>,
    sequencer: Arc<RequestSequencer>,
    current_user: RwLock<Option<User>>,
}

impl SessionStore {
    pub fn new(
        api: ApiClient,
        notifier: Arc<NotificationCenter>,
        sequencer: Arc<RequestSequencer>,
    ) -> Self {
        Self {
            api,
            notifier,
            sequencer,
            current_user: RwLock::new(None),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn current_user(&self) -> Option<User> {
        self.current_user.read().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_user.read().is_some()
    }

    /// Creates an account. Does not sign in; the user logs in afterwards.
    pub async fn register(&self, form: RegisterForm) -> Result<()> {
        let result = async {
            let request = form.into_request()?;
            self.api
                .post::<_, Empty>("/user/register/", &request, false)
                .await
        }
        .await;

        match result {
            Ok(_) => {
                info!("account registered");
                self.notifier
                    .success("Register successful! Please login to your account.");
                Ok(())
            }
            Err(e) => {
                self.notifier.api_error("register", &e);
                Err(e)
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let result = async {
            request.validate()?;
            self.api
                .post::<_, AuthResponse>("/user/login/", &request, false)
                .await
        }
        .await;

        match result {
            Ok(auth) => {
                self.api.set_token(Some(SecretString::from(auth.token)));
                // A login supersedes any user fetch still in flight.
                self.sequencer.invalidate(Resource::User);
                *self.current_user.write() = Some(auth.user.clone());
                info!(user_id = %auth.user.id, "signed in");
                self.notifier.success("Login successful!");
                Ok(auth.user)
            }
            Err(e) => {
                self.notifier.api_error("login", &e);
                Err(e)
            }
        }
    }

    /// Invalidates the token server-side, then forgets it locally.
    pub async fn logout(&self) -> Result<()> {
        let result = self
            .api
            .perform::<(), Empty>(Method::POST, "/user/logout/", None, true)
            .await;

        match result {
            Ok(_) => {
                self.api.set_token(None);
                self.sequencer.invalidate(Resource::User);
                *self.current_user.write() = None;
                info!("signed out");
                self.notifier.success("Logout successful!");
                Ok(())
            }
            Err(e) => {
                self.notifier.api_error("logout", &e);
                Err(e)
            }
        }
    }

    /// Re-fetches the signed-in user, e.g. after `has_posted` changed.
    pub async fn refresh_user(&self) -> Result<User> {
        let ticket = self.sequencer.begin(Resource::User);
        match self.api.get::<UserEnvelope>("/user/get/", true).await {
            Ok(envelope) => {
                if self.sequencer.is_latest(ticket) {
                    *self.current_user.write() = Some(envelope.user.clone());
                } else {
                    debug!(seq = ticket.seq(), "discarding stale user response");
                }
                Ok(envelope.user)
            }
            Err(e) => {
                self.notifier.api_error("get_user", &e);
                Err(e)
            }
        }
    }

    /// Resumes a session from a stored token. A rejected token is dropped.
    pub async fn restore(&self, token: SecretString) -> Result<User> {
        self.api.set_token(Some(token));
        let result = self.refresh_user().await;
        if let Err(ApiError::Unauthorized(_)) = &result {
            self.api.set_token(None);
        }
        result
    }
}
