//! Page-side session gate.
//!
//! Runs after a page has mounted and re-checks the session on its own,
//! independent of whatever the edge gatekeeper decided for the same request.
//! Unlike the edge, it lets anonymous visitors through on demo paths: the edge
//! only ever routes demo paths to the canonical (protected) page, so this is
//! the check that actually makes the demo browsable.

use serde::Serialize;

use crate::backend::AuthBackend;
use crate::config::RoutingRules;
use super::classify::is_under;
use super::session::{OracleVerdict, SessionContext, SessionState};

/// What the page should show right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "render", rename_all = "lowercase")]
pub enum RenderDecision {
    /// Neutral loading indicator and nothing else.
    Loading,
    /// The protected page content.
    Children,
    /// Navigate to `to` and render nothing meanwhile.
    Navigate { to: String },
}

/// Render policy over an explicit session state.
pub fn render_decision(state: &SessionState, browser_path: &str, rules: &RoutingRules) -> RenderDecision {
    match state {
        SessionState::Loading => RenderDecision::Loading,
        SessionState::Authenticated(_) => RenderDecision::Children,
        SessionState::Unauthenticated if is_under(browser_path, &rules.demo_prefix) => RenderDecision::Children,
        SessionState::Unauthenticated => RenderDecision::Navigate {
            to: rules.login_path.clone(),
        },
    }
}

/// Identifies one mount's session check. Results carrying a ticket that is no
/// longer current are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountTicket(u64);

#[derive(Debug, Clone)]
pub struct ClientSessionGate {
    rules: RoutingRules,
    state: SessionState,
    generation: u64,
    mounted: bool,
}

impl ClientSessionGate {
    pub fn new(rules: RoutingRules) -> Self {
        Self {
            rules,
            state: SessionState::Loading,
            generation: 0,
            mounted: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Start a fresh check. State goes back to `Loading`; nothing from a
    /// previous mount carries over.
    pub fn mount(&mut self) -> MountTicket {
        self.generation += 1;
        self.mounted = true;
        self.state = SessionState::Loading;
        MountTicket(self.generation)
    }

    pub fn unmount(&mut self) {
        self.generation += 1;
        self.mounted = false;
    }

    /// Apply a session result. Returns false when the result was stale and
    /// discarded.
    pub fn resolve(&mut self, ticket: MountTicket, verdict: OracleVerdict) -> bool {
        if !self.mounted || ticket.0 != self.generation {
            tracing::debug!("Discarding stale session result for mount {}", ticket.0);
            return false;
        }
        self.state = SessionState::from(verdict);
        true
    }

    pub fn render(&self, browser_path: &str) -> RenderDecision {
        render_decision(&self.state, browser_path, &self.rules)
    }

    /// Mount, query the session with the browser's own credentials and apply
    /// the answer.
    pub async fn check(&mut self, backend: &dyn AuthBackend, browser: &SessionContext) -> &SessionState {
        let ticket = self.mount();
        let verdict = backend.session(browser).await;
        self.resolve(ticket, verdict);
        &self.state
    }
}
