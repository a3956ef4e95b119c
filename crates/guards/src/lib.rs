//! Route guards.
//!
//! `AuthGuard` and `AdminGuard` read the session synchronously and refuse
//! navigation with a redirect plus a notice. `RouteGate` applies them per
//! route and drives the navigator.

pub mod gate;
pub mod guard;
pub mod notice;

use std::sync::Arc;

use session_service_lib::navigation::Navigator;
use session_service_lib::service::SessionService;

pub use gate::RouteGate;
pub use guard::{AdminGuard, AuthGuard, DenialReason, GuardDecision, RouteGuard};
pub use notice::{Notice, NoticeBoard, NoticeLevel};

/// Wire both guards onto `session` and return the gate.
pub fn route_gate(
    session: Arc<dyn SessionService>,
    navigator: Arc<dyn Navigator>,
    notices: NoticeBoard,
) -> RouteGate {
    let auth = Arc::new(AuthGuard::new(session.clone(), notices.clone()));
    let admin = Arc::new(AdminGuard::new(session, notices));
    RouteGate::new(auth, admin, navigator)
}
