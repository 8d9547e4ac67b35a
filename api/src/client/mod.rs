//! Remote procedure client for native apps: typed calls to `/rpc/*` plus a
//! polling query cache and the connection-status monitor built on it.

pub mod error;
pub mod health;
pub mod procedures;
pub mod query;
pub mod transport;

pub use error::RpcClientError;
pub use health::{ConnectionStatus, HealthMonitor, HealthSnapshot};
pub use procedures::RpcClient;
pub use query::{QueryHandle, QueryPhase, QueryPolicy, QueryState};
pub use transport::{HttpTransport, RpcTransport};
