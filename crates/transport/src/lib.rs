//! Switchboard HTTP transport.
//!
//! Implements the [`access::Transport`] port over `reqwest`, plus the
//! bounded-wait decorator used to put a hard ceiling on one flaky
//! downstream call.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL assembly, header stamping, JSON body
//! serialisation, and timeout configuration all live here. The [`access`]
//! crate sees only [`access::Transport`].

mod bounded;
mod http;

pub use bounded::with_deadline;
pub use http::{HttpTransport, TransportConfig};
