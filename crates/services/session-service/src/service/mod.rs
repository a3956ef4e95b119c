//! Service layer for session business logic.

mod session_service;
mod stream;

pub use session_service::{SessionManager, SessionService};
pub use stream::identity_changes;

#[cfg(any(test, feature = "test-utils"))]
pub use session_service::MockSessionService;
