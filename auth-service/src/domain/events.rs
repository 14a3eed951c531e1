//! # Domain Events
//!
//! Domain events represent significant state changes in the identity
//! domain. They are not dispatched to a message bus — there are no
//! process-wide mutable caches or queues in this service (§5) — but are
//! structured payloads attached to the `tracing` span of the handler that
//! produced them, giving audit logging and analytics a stable shape to grep
//! or index without coupling callers to a broker.
//!
//! ## Event Flow
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────────┐
//! │  Auth Service   │────▶│  tracing::info! │────▶│  Log aggregator     │
//! │  (produces)     │     │  (structured)   │     │  (audit, analytics) │
//! └─────────────────┘     └─────────────────┘     └─────────────────────┘
//! ```
//!
//! ## Available Events
//!
//! | Event             | Trigger                              |
//! |--------------------|--------------------------------------|
//! | `UserRegistered`  | Signup or admin-create completes      |
//! | `UserLoggedIn`    | Password or temp-token login succeeds |
//! | `ProfileSwitched` | `SwitchProfile` mints a new token pair|
//! | `ContactVerified` | `VerifyContact` applies a verification|
//! | `PasswordChanged` | Password changed or reset completes   |
//!
//! ## Related Documentation
//!
//! - Structured logging: [`shared::tracing_config`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// BASE EVENT TRAIT
// =============================================================================

/// Common interface for all domain events.
///
/// Events implementing this trait can be serialized into a `tracing` span
/// as structured fields, or logged directly as JSON.
pub trait DomainEvent: Serialize + Send + Sync {
    /// Returns the event type name for routing/filtering in log queries.
    fn event_type(&self) -> &'static str;

    /// Returns when the event occurred.
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Returns the aggregate ID (the user) this event relates to.
    fn aggregate_id(&self) -> Uuid;
}

// =============================================================================
// USER REGISTRATION
// =============================================================================

/// Emitted when a new user is created, via signup (§4.5.3) or admin-create
/// (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegistered {
    pub user_id: Uuid,
    pub instance_id: String,
    pub account_id: String,
    /// Role set at creation time.
    pub roles: Vec<String>,
    /// `true` when created by an admin (`CreateUser`) rather than self-signup.
    pub via_admin: bool,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent for UserRegistered {
    fn event_type(&self) -> &'static str {
        "user.registered"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    fn aggregate_id(&self) -> Uuid {
        self.user_id
    }
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

/// Emitted when a user successfully authenticates, by password (§4.5.1) or
/// temp-token (§4.5.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLoggedIn {
    pub user_id: Uuid,
    pub instance_id: String,
    /// `"password"` or `"temp-token"`.
    pub method: String,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent for UserLoggedIn {
    fn event_type(&self) -> &'static str {
        "user.logged_in"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    fn aggregate_id(&self) -> Uuid {
        self.user_id
    }
}

/// Emitted when `SwitchProfile` successfully rotates the refresh token and
/// mints a new access token under a different `selectedProfileId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSwitched {
    pub user_id: Uuid,
    pub instance_id: String,
    pub previous_profile_id: Option<Uuid>,
    pub new_profile_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent for ProfileSwitched {
    fn event_type(&self) -> &'static str {
        "user.profile_switched"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    fn aggregate_id(&self) -> Uuid {
        self.user_id
    }
}

// =============================================================================
// VERIFICATION
// =============================================================================

/// Emitted when `VerifyContact` applies a verification outcome (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactVerified {
    pub user_id: Uuid,
    pub instance_id: String,
    pub contact_info_id: Uuid,
    /// Whether this verification also confirmed the account (I6) — true
    /// only when the verified address matched `account.accountId`.
    pub account_confirmed: bool,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent for ContactVerified {
    fn event_type(&self) -> &'static str {
        "user.contact_verified"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    fn aggregate_id(&self) -> Uuid {
        self.user_id
    }
}

/// Emitted when a password is changed, either via `ChangePassword` (§4.5.7)
/// or `ResetPassword` (§4.6.1). Both clear the refresh-token ring, so this
/// event also signals "every other session was just logged out".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChanged {
    pub user_id: Uuid,
    pub instance_id: String,
    /// `true` if this went through the forgot-password reset flow rather
    /// than an authenticated change.
    pub via_reset: bool,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent for PasswordChanged {
    fn event_type(&self) -> &'static str {
        "user.password_changed"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    fn aggregate_id(&self) -> Uuid {
        self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_registered_event_type() {
        let event = UserRegistered {
            user_id: Uuid::new_v4(),
            instance_id: "instance-1".to_string(),
            account_id: "user@example.com".to_string(),
            roles: vec!["PARTICIPANT".to_string()],
            via_admin: false,
            occurred_at: Utc::now(),
        };
        assert_eq!(event.event_type(), "user.registered");
        assert_eq!(event.aggregate_id(), event.user_id);
    }

    #[test]
    fn test_profile_switched_serializes() {
        let event = ProfileSwitched {
            user_id: Uuid::new_v4(),
            instance_id: "instance-1".to_string(),
            previous_profile_id: Some(Uuid::new_v4()),
            new_profile_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("new_profile_id"));
    }
}
