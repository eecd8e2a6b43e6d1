//! HTTP backing for the reset flows. `transport` owns the client and maps
//! responses onto transport results, while `parse` reads rejection bodies.

mod parse;
mod transport;

pub use transport::{HttpResetTransport, DEFAULT_USER_AGENT, MAX_REJECTION_BODY};
