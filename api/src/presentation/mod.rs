pub mod http;
pub mod openapi;
pub mod router;
pub mod rpc;
