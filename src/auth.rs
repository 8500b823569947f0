use crate::errors::ClientError;
use crate::models::{AuthResponse, Session, SignInRequest, SignUpRequest};
use crate::nav::Route;
use crate::state::{AppContext, Shared, claim, release, shared};
use tracing::error;

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Landing page and the sign-in / sign-up modals.
#[derive(Clone)]
pub struct Auth {
    ctx: AppContext,
    state: Shared<AuthState>,
}

impl Auth {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            state: shared(AuthState::default()),
        }
    }

    pub async fn state(&self) -> AuthState {
        self.state.lock().await.clone()
    }

    /// Where a freshly started client should land.
    pub fn entry_route(&self) -> Route {
        if self.ctx.session.is_authenticated() {
            Route::Dashboard
        } else {
            Route::Landing
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let request = SignInRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        if request.email.is_empty() || request.password.is_empty() {
            return self.reject(ClientError::validation("Email and password are required")).await;
        }

        self.submit(async { self.ctx.api.sign_in(&request).await }, "Sign in failed")
            .await
    }

    pub async fn sign_up(&self, form: SignUpForm) -> Result<Session, ClientError> {
        let request = SignUpRequest {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            password: form.password,
        };
        if request.name.is_empty() || request.email.is_empty() || request.password.is_empty() {
            return self
                .reject(ClientError::validation("Name, email and password are required"))
                .await;
        }

        self.submit(async { self.ctx.api.sign_up(&request).await }, "Sign up failed")
            .await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.ctx.sign_out().await
    }

    async fn submit(
        &self,
        request: impl Future<Output = Result<AuthResponse, ClientError>>,
        fallback: &str,
    ) -> Result<Session, ClientError> {
        claim(&self.state, |s: &mut AuthState| &mut s.loading, "authentication").await?;
        self.state.lock().await.error = None;

        let result = match request.await {
            Ok(AuthResponse { user, token }) => {
                let session = Session { token, user };
                self.ctx
                    .session
                    .set(session.clone())
                    .await
                    .map(|()| session)
            }
            Err(err) => Err(err),
        };

        release(&self.state, |s: &mut AuthState| &mut s.loading).await;
        match result {
            Ok(session) => {
                self.ctx.navigator.navigate(Route::Dashboard);
                Ok(session)
            }
            Err(err) => {
                error!("{fallback}: {err}");
                let message = match &err {
                    ClientError::Http { message, .. } if !message.is_empty() => message.clone(),
                    ClientError::Network(_) => fallback.to_string(),
                    other => other.to_string(),
                };
                self.state.lock().await.error = Some(message);
                Err(err)
            }
        }
    }

    async fn reject<T>(&self, err: ClientError) -> Result<T, ClientError> {
        self.state.lock().await.error = Some(err.to_string());
        Err(err)
    }
}
