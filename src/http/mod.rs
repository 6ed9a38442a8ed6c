//! Request description, transport and the authenticated executor.

pub mod executor;
pub mod request;
pub mod transport;

pub use executor::Executor;
pub use request::{Request, Target};
pub use transport::{RawResponse, ReqwestTransport, Transport};
