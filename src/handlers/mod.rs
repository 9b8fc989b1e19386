// handlers/mod.rs - gateway endpoints
//
// Every route here sits in a namespace the gatekeeper treats as public
// (/api/* and /logout). Page requests fall through to pages::page after the
// gatekeeper has made its decision.

pub mod company;  // GET|POST /api/company
pub mod health;   // GET /api/health
pub mod logout;   // GET|POST /logout
pub mod pages;    // router fallback
pub mod session;  // GET /api/session

pub use company::{company_get, company_post};
pub use health::health;
pub use logout::logout;
pub use pages::page;
pub use session::session_get;
