use std::sync::Arc;

use chrono::Utc;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde_json::json;
use tokio::sync::RwLock;
use url::Url;

use plugged_data_core::http::{api_key_headers, upstream_error};
use plugged_data_core::{ClientError, Connection, EmptyResponse, ErrorInfo, Response};
use plugged_data_query::{ConnectionQueryExt, Filterable};

use crate::store::SessionStore;
use crate::types::{Profile, Session, SessionData};

/// Message returned when a valid account is not an administrator.
pub const ADMIN_REQUIRED: &str = "Unauthorized: Admin access required";

const PROFILES_TABLE: &str = "profiles";
const PROFILE_COLUMNS: &str = "id, is_admin, display_name";

/// Password sign-in restricted to administrators, with a durable session.
///
/// The administrator check reads `profiles.is_admin` with the same key used
/// for every other request. It keeps non-admin accounts out of the dashboard
/// but does not protect data; row-level policies on the server do.
///
/// Clones share the same session.
#[derive(Clone)]
pub struct AuthClient {
    conn: Connection,
    base_url: Url,
    session: Arc<RwLock<Option<Session>>>,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", &self.base_url.as_str())
            .field("store", &self.store)
            .finish()
    }
}

impl AuthClient {
    pub fn new(conn: Connection, store: Arc<dyn SessionStore>) -> Result<Self, ClientError> {
        let base_url = Url::parse(&conn.auth_url())
            .map_err(|e| ClientError::config(format!("Invalid auth URL: {e}")))?;
        Ok(Self {
            conn,
            base_url,
            session: Arc::new(RwLock::new(None)),
            store,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ─── Sign In ───────────────────────────────────────────────

    /// Sign in with email and password, then require an administrator profile.
    ///
    /// An account without an admin profile is signed out again and gets an
    /// authorization error. A failed profile lookup also signs out and
    /// returns the lookup's error.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Response<Session> {
        let mut session = match self.password_grant(email, password).await {
            Ok(session) => session,
            Err(e) => return Response::error(e),
        };

        match self.lookup_profile(&session.user.id).await {
            Ok(Some(profile)) if profile.is_admin() => {}
            Ok(_) => {
                tracing::warn!(user_id = %session.user.id, "Sign-in rejected: not an administrator");
                self.discard(Some(session.access_token)).await;
                return Response::error(ErrorInfo::unauthorized(ADMIN_REQUIRED));
            }
            Err(e) => {
                tracing::warn!(user_id = %session.user.id, "Profile lookup failed during sign-in: {e}");
                self.discard(Some(session.access_token)).await;
                return Response::error(e);
            }
        }

        session.user.is_admin = Some(true);
        if session.expires_at.is_none() && session.expires_in > 0 {
            session.expires_at = Some(Utc::now().timestamp() + session.expires_in);
        }
        *self.session.write().await = Some(session.clone());
        if let Err(e) = self.store.save(&session) {
            tracing::warn!("Signed in, but the session could not be persisted: {e}");
        }
        Response::ok(session)
    }

    // ─── Sign Out ──────────────────────────────────────────────

    /// Forget the session locally, then ask the server to revoke it.
    ///
    /// Local state is always cleared first. The logout status code is not
    /// checked; a transport or store failure is reported in the envelope.
    pub async fn sign_out(&self) -> EmptyResponse {
        self.discard(None).await
    }

    // ─── Session ───────────────────────────────────────────────

    /// The current session: memory first, then the durable store.
    ///
    /// A stored session that cannot be read, or whose `expires_at` has passed,
    /// is treated as absent.
    pub async fn get_session(&self) -> Response<SessionData> {
        if let Some(session) = self.session.read().await.clone() {
            return Response::ok(SessionData {
                session: Some(session),
            });
        }

        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Ignoring unreadable stored session: {e}");
                None
            }
        };

        let session = match stored {
            Some(stored) if stored.is_expired() => {
                tracing::warn!(user_id = %stored.user.id, "Discarding expired stored session");
                if let Err(e) = self.store.clear() {
                    tracing::warn!("Failed to clear expired session: {e}");
                }
                return Response::ok(SessionData::default());
            }
            Some(stored) => {
                let mut guard = self.session.write().await;
                guard.get_or_insert(stored).clone()
            }
            None => return Response::ok(SessionData::default()),
        };
        Response::ok(SessionData {
            session: Some(session),
        })
    }

    /// Shorthand for the session inside [`get_session`](Self::get_session).
    pub async fn current_session(&self) -> Option<Session> {
        self.get_session()
            .await
            .into_result()
            .ok()
            .flatten()
            .and_then(|data| data.session)
    }

    // ─── Internal Helpers ──────────────────────────────────────

    fn url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let current = url.path().trim_end_matches('/').to_string();
        if let Some((route, query)) = path.split_once('?') {
            url.set_path(&format!("{current}{route}"));
            url.set_query(Some(query));
        } else {
            url.set_path(&format!("{current}{path}"));
        }
        url
    }

    fn redacted(&self, err: ErrorInfo) -> ErrorInfo {
        err.redact(self.conn.api_key())
    }

    async fn password_grant(&self, email: &str, password: &str) -> Result<Session, ErrorInfo> {
        let headers = api_key_headers(self.conn.api_key()).map_err(ErrorInfo::from)?;
        let url = self.url("/token?grant_type=password");
        tracing::debug!(url = %url, "Requesting password grant");

        let resp = self
            .conn
            .http()
            .post(url)
            .headers(headers)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| self.redacted(ErrorInfo::transport(e.to_string())))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| self.redacted(ErrorInfo::transport(e.to_string())))?;
        if !(200..300).contains(&status) {
            return Err(self.redacted(upstream_error(status, &body, "Authentication failed")));
        }

        serde_json::from_str(&body)
            .map_err(|e| ErrorInfo::serialization(format!("Invalid session response: {e}")))
    }

    async fn lookup_profile(&self, user_id: &str) -> Result<Option<Profile>, ErrorInfo> {
        self.conn
            .from(PROFILES_TABLE)
            .select_as::<Profile>(PROFILE_COLUMNS)
            .eq("user_id", user_id)
            .single()
            .await
            .into_result()
    }

    /// Clear memory and store, then post the logout.
    ///
    /// `access_token` overrides the token of the session held in memory.
    async fn discard(&self, access_token: Option<String>) -> EmptyResponse {
        let held = self.session.write().await.take();
        let token = access_token.or(held.map(|s| s.access_token));

        let cleared = self.store.clear().map_err(|e| {
            tracing::error!("Failed to clear stored session: {e}");
            ErrorInfo::from(e)
        });
        let revoked = self.post_logout(token.as_deref()).await;

        match (cleared, revoked) {
            (Err(e), _) | (Ok(()), Err(e)) => EmptyResponse::error(e),
            (Ok(()), Ok(())) => EmptyResponse::ok(),
        }
    }

    async fn post_logout(&self, access_token: Option<&str>) -> Result<(), ErrorInfo> {
        let mut headers = api_key_headers(self.conn.api_key()).map_err(ErrorInfo::from)?;
        if let Some(token) = access_token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        let url = self.url("/logout");
        tracing::debug!(url = %url, "Posting logout");
        match self.conn.http().post(url).headers(headers).send().await {
            Ok(resp) => {
                tracing::debug!(status = resp.status().as_u16(), "Logout answered");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Logout request failed: {e}");
                Err(self.redacted(ErrorInfo::transport(e.to_string())))
            }
        }
    }
}
