//! Auth and admin guards.
//!
//! Guards are synchronous: they read the session's current identity and
//! either allow the navigation or name a redirect. A denial also publishes
//! a notice explaining why.

use std::sync::Arc;

use tracing::{debug, info};

use domain::{NavigationTarget, Route};
use session_service_lib::service::SessionService;

use crate::notice::{Notice, NoticeBoard};

/// Why a navigation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    SignInRequired,
    AdminRequired,
}

impl DenialReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenialReason::SignInRequired => "Please sign in to access this page.",
            DenialReason::AdminRequired => {
                "You do not have permission to access this page. Only administrators can view it."
            }
        }
    }
}

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect {
        target: NavigationTarget,
        reason: DenialReason,
    },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }

    /// Run `next` only if this decision allows
    pub fn and_then(self, next: impl FnOnce() -> GuardDecision) -> GuardDecision {
        match self {
            GuardDecision::Allow => next(),
            denied => denied,
        }
    }
}

/// Gatekeeper for a route
pub trait RouteGuard: Send + Sync {
    fn name(&self) -> &'static str;

    /// Decide whether navigation to `requested` (path plus query) may proceed
    fn check(&self, requested: &str) -> GuardDecision;
}

fn deny(notices: &NoticeBoard, target: NavigationTarget, reason: DenialReason) -> GuardDecision {
    notices.publish(Notice::warning(reason.message()));
    GuardDecision::Redirect { target, reason }
}

/// Allows any signed-in user.
pub struct AuthGuard {
    session: Arc<dyn SessionService>,
    notices: NoticeBoard,
}

impl AuthGuard {
    pub fn new(session: Arc<dyn SessionService>, notices: NoticeBoard) -> Self {
        Self { session, notices }
    }
}

impl RouteGuard for AuthGuard {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn check(&self, requested: &str) -> GuardDecision {
        if self.session.is_authenticated() {
            debug!(requested, "Auth guard allowed");
            return GuardDecision::Allow;
        }

        info!(requested, "Auth guard redirecting to login");
        deny(
            &self.notices,
            NavigationTarget::login_returning_to(requested),
            DenialReason::SignInRequired,
        )
    }
}

/// Allows signed-in users on the admin allow-list.
pub struct AdminGuard {
    session: Arc<dyn SessionService>,
    notices: NoticeBoard,
}

impl AdminGuard {
    pub fn new(session: Arc<dyn SessionService>, notices: NoticeBoard) -> Self {
        Self { session, notices }
    }
}

impl RouteGuard for AdminGuard {
    fn name(&self) -> &'static str {
        "admin"
    }

    fn check(&self, requested: &str) -> GuardDecision {
        if !self.session.is_authenticated() {
            info!(requested, "Admin guard redirecting to login");
            return deny(
                &self.notices,
                NavigationTarget::login_returning_to(requested),
                DenialReason::SignInRequired,
            );
        }

        if self.session.is_admin() {
            debug!(requested, "Admin guard allowed");
            return GuardDecision::Allow;
        }

        info!(requested, "Admin guard redirecting non-admin to dashboard");
        deny(
            &self.notices,
            NavigationTarget::to(Route::Dashboard),
            DenialReason::AdminRequired,
        )
    }
}
