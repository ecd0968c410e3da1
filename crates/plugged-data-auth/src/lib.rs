//! Password sign-in for the admin dashboard.
//!
//! Sign-in succeeds only for accounts whose `profiles` row has `is_admin`
//! set. The session is kept in memory and mirrored to a [`SessionStore`] so a
//! restarted dashboard can pick it up again.

pub mod client;
pub mod store;
pub mod types;

pub use client::{AuthClient, ADMIN_REQUIRED};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, SESSION_SLOT};
pub use types::{Profile, Session, SessionData, User};
