//! Authenticated forwarding with a single refresh-and-retry.
//!
//! [`Gateway::forward`] drives an explicit state machine:
//!
//! ```text
//!   Unauthenticated ──refresh ok──▶ FirstAttempt ──401, no refresh yet──▶ RetryAfterRefresh
//!         │                              │                                      │
//!    refresh fails                  any other status                      any status
//!         ▼                              ▼                                      ▼
//!      Failed                         Success                                Success
//! ```
//!
//! Transitions only move forward, so an invocation makes at most one refresh
//! call and at most two calls to the target endpoint. Transport failures end
//! in `Failed(Unavailable)` from any state and never count as a 401.

use axum::http::StatusCode;

use crate::config::GatewayConfig;
use crate::credentials::{StoredCredentials, TokenPair};
use crate::error::{GatewayError, Result};
use crate::upstream::{HEALTH_PATH, ProxyRequest, UpstreamClient, UpstreamResponse};

/// The upstream response to relay, plus a token pair to store when a refresh
/// happened during the invocation.
#[derive(Debug, Clone)]
pub struct Forwarded {
    pub response: UpstreamResponse,
    pub rotated: Option<TokenPair>,
}

/// States of a single forward invocation.
enum AttemptState {
    /// No access token held; a refresh is required before any call.
    Unauthenticated,
    /// Calling the target with `access_token`. `refreshed` is set when the
    /// token came from a refresh in the `Unauthenticated` state.
    FirstAttempt {
        access_token: String,
        refreshed: Option<TokenPair>,
    },
    /// The first attempt got a 401 and a refresh produced `tokens`.
    RetryAfterRefresh { tokens: TokenPair },
}

impl AttemptState {
    fn name(&self) -> &'static str {
        match self {
            AttemptState::Unauthenticated => "unauthenticated",
            AttemptState::FirstAttempt { .. } => "first_attempt",
            AttemptState::RetryAfterRefresh { .. } => "retry_after_refresh",
        }
    }
}

/// Terminal outcomes.
enum Outcome {
    Success(Forwarded),
    Failed(GatewayError),
}

enum Transition {
    Next(AttemptState),
    Done(Outcome),
}

fn success(response: UpstreamResponse, rotated: Option<TokenPair>) -> Transition {
    Transition::Done(Outcome::Success(Forwarded { response, rotated }))
}

fn failed(error: GatewayError) -> Transition {
    Transition::Done(Outcome::Failed(error))
}

/// The authenticated proxy gateway.
#[derive(Debug, Clone)]
pub struct Gateway {
    upstream: UpstreamClient,
}

impl Gateway {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            upstream: UpstreamClient::new(config),
        }
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    /// Forward `request` upstream with the browser's credentials.
    ///
    /// Fails fast with [`GatewayError::Configuration`] when no base URL is
    /// configured, before any network call.
    pub async fn forward(
        &self,
        credentials: &StoredCredentials,
        request: &ProxyRequest,
    ) -> Result<Forwarded> {
        self.upstream.base_url()?;

        let mut state = match credentials.access_token() {
            Some(token) => AttemptState::FirstAttempt {
                access_token: token.to_string(),
                refreshed: None,
            },
            None => AttemptState::Unauthenticated,
        };

        loop {
            tracing::trace!(state = state.name(), path = %request.path, "Proxy state");
            match self.advance(state, credentials, request).await {
                Transition::Next(next) => state = next,
                Transition::Done(Outcome::Success(forwarded)) => return Ok(forwarded),
                Transition::Done(Outcome::Failed(error)) => return Err(error),
            }
        }
    }

    async fn advance(
        &self,
        state: AttemptState,
        credentials: &StoredCredentials,
        request: &ProxyRequest,
    ) -> Transition {
        match state {
            AttemptState::Unauthenticated => {
                match self.upstream.refresh_tokens(credentials.refresh_token()).await {
                    Ok(Some(tokens)) => Transition::Next(AttemptState::FirstAttempt {
                        access_token: tokens.access_token.clone(),
                        refreshed: Some(tokens),
                    }),
                    Ok(None) => failed(GatewayError::Unauthenticated),
                    Err(e) => failed(e),
                }
            }

            AttemptState::FirstAttempt {
                access_token,
                refreshed,
            } => {
                let response = match self.upstream.send(request, &access_token).await {
                    Ok(response) => response,
                    Err(e) => return failed(e),
                };

                if !response.is_unauthorized() {
                    return success(response, refreshed);
                }

                // The one refresh of this invocation was already spent.
                if refreshed.is_some() {
                    tracing::warn!(path = %request.path, "Freshly refreshed token rejected upstream");
                    return success(response, refreshed);
                }

                match self.upstream.refresh_tokens(credentials.refresh_token()).await {
                    Ok(Some(tokens)) => Transition::Next(AttemptState::RetryAfterRefresh { tokens }),
                    Ok(None) => success(response, None),
                    Err(e) => failed(e),
                }
            }

            AttemptState::RetryAfterRefresh { tokens } => {
                match self.upstream.send(request, &tokens.access_token).await {
                    Ok(response) => success(response, Some(tokens)),
                    Err(e) => failed(e),
                }
            }
        }
    }

    /// Relay the upstream health endpoint without credentials.
    pub async fn health(&self) -> Result<UpstreamResponse> {
        self.upstream
            .send_anonymous(&ProxyRequest::get(HEALTH_PATH))
            .await
    }
}

impl Forwarded {
    pub fn status(&self) -> StatusCode {
        self.response.status
    }
}
