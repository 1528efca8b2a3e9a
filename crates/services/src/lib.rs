pub mod admin;
pub mod auth;
pub mod calendar;
pub mod checkin;
pub mod dao;
pub mod export;
pub mod identity;
pub mod report;
pub mod session;
pub mod stream;

pub use admin::{AdminAccess, DenialReason, RoleLookup, check_admin};
pub use auth::AuthService;
pub use checkin::{CheckInOutcome, CheckInRequest, CheckInService};
pub use identity::{Identity, LocalProfile, VerifiedSession};
pub use session::{AuthEvent, SessionStore, Subscription};
