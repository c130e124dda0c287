use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng as _;
use tracing::{debug, info, warn};

use crate::{error::AppError, state::AppState};

pub const SESSION_COOKIE: &str = "session";

/// Context of one logged-in browser session, handed to every handler that
/// needs an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub token: String,
    pub account: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Live sessions keyed by token. Expired entries are rejected on lookup and
/// swept out on every login.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionContext>>,
    ttl: TimeDelta,
}

/// Unknown account and wrong password are indistinguishable to the caller.
pub fn verify_credentials(users: &HashMap<String, String>, account: &str, password: &str) -> bool {
    users
        .get(account)
        .is_some_and(|expected| expected == password)
}

fn new_token() -> String {
    format!("{:032x}", rand::rng().random::<u128>())
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::default(),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn login(
        &self,
        users: &HashMap<String, String>,
        account: &str,
        password: &str,
    ) -> Result<SessionContext, AppError> {
        self.login_at(users, account, password, Utc::now())
    }

    fn login_at(
        &self,
        users: &HashMap<String, String>,
        account: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionContext, AppError> {
        if !verify_credentials(users, account, password) {
            warn!("Rejected login attempt");
            return Err(AppError::Unauthorized);
        }

        let context = SessionContext {
            token: new_token(),
            account: account.to_string(),
            created_at: now,
            expires_at: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!(pruned, "Pruned expired sessions");
        }
        sessions.insert(context.token.clone(), context.clone());
        info!(account, "Session started");
        Ok(context)
    }

    pub fn get(&self, token: &str) -> Option<SessionContext> {
        self.get_at(token, Utc::now())
    }

    fn get_at(&self, token: &str, now: DateTime<Utc>) -> Option<SessionContext> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if sessions.get(token)?.is_expired(now) {
            sessions.remove(token);
            return None;
        }
        sessions.get(token).cloned()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn logout(&self, token: &str) -> Option<SessionContext> {
        let removed = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
        if let Some(context) = &removed {
            info!(account = %context.account, "Session ended");
        }
        removed
    }
}

/// Value of the session cookie in a `Cookie` header, if any.
pub fn session_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax")
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

impl<S> FromRequestParts<S> for SessionContext
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        session_token(parts)
            .and_then(|token| state.sessions.get(&token))
            .ok_or(AppError::Unauthorized)
    }
}
