// gate/ - authorization and routing decisions
//
// Everything in here is decision logic over explicit inputs (path, routing
// rules, SessionContext, oracle verdict). HTTP plumbing lives in middleware/
// and handlers/.

pub mod classify;
pub mod client;
pub mod demo;
pub mod edge;
pub mod session;

pub use classify::{classify, PathClass};
pub use client::{render_decision, ClientSessionGate, MountTicket, RenderDecision};
pub use demo::{rewrite_demo_path, rewrite_path_and_query};
pub use edge::{authorize, login_redirect, Access, AllowReason, EdgeDecision, Gatekeeper};
pub use session::{OracleVerdict, SessionContext, SessionState, SessionUser};
