//! Route gate: applies the guards a route needs, then navigates.

use std::sync::Arc;

use tracing::debug;

use domain::{Access, NavigationTarget, Route};
use session_service_lib::navigation::Navigator;

use crate::guard::{GuardDecision, RouteGuard};

/// Resolves a requested path, runs its guards in order and sends the
/// navigator to the route or to the redirect target.
pub struct RouteGate {
    auth: Arc<dyn RouteGuard>,
    admin: Arc<dyn RouteGuard>,
    navigator: Arc<dyn Navigator>,
}

fn run(guard: &dyn RouteGuard, requested: &str) -> GuardDecision {
    let decision = guard.check(requested);
    if !decision.is_allowed() {
        debug!(guard = guard.name(), requested, "Guard refused");
    }
    decision
}

impl RouteGate {
    pub fn new(
        auth: Arc<dyn RouteGuard>,
        admin: Arc<dyn RouteGuard>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            auth,
            admin,
            navigator,
        }
    }

    /// Decide without navigating
    pub fn evaluate(&self, requested: &str) -> (Route, GuardDecision) {
        let route = Route::parse(requested);
        let decision = match route.access() {
            Access::Public => GuardDecision::Allow,
            Access::Authenticated => run(self.auth.as_ref(), requested),
            Access::Admin => run(self.auth.as_ref(), requested)
                .and_then(|| run(self.admin.as_ref(), requested)),
        };
        debug!(requested, route = route.title(), allowed = decision.is_allowed(), "Route evaluated");
        (route, decision)
    }

    /// Evaluate and navigate to the route or to the redirect
    pub fn visit(&self, requested: &str) -> GuardDecision {
        let (route, decision) = self.evaluate(requested);
        let target = match &decision {
            GuardDecision::Allow => NavigationTarget::to(route),
            GuardDecision::Redirect { target, .. } => target.clone(),
        };
        self.navigator.navigate(target);
        decision
    }
}
