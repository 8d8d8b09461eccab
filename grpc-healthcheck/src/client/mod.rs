//! gRPC client side of the health check
//!
//! [`transport::build`] produces the channel and [`invoker::invoke`] performs the
//! one `Health/Check` call over it. Interpretation of the result lives in
//! [`crate::outcome`].

pub mod invoker;
pub mod transport;

pub use invoker::{invoke, RawResult};
pub use transport::{build, TransportError};
