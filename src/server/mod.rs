//! Server side of the connection lifecycle
//!
//! The listener accepts streams, the dispatcher gives each one a worker from
//! a bounded pool, and the registry tracks live workers so shutdown can wait
//! for all of them.

pub mod dispatcher;
pub mod listener;
pub mod registry;

pub use dispatcher::{DispatchError, Dispatcher};
pub use registry::Registry;
