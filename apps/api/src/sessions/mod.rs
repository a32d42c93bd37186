// Session history: validated three-question sessions appended to an
// injected store, plus per-session coaching comments.

pub mod aggregator;
pub mod comments;
pub mod handlers;
pub mod models;
pub mod store;

pub use store::{InMemorySessionStore, SessionStore};
