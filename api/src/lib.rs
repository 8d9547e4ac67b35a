// Module layout (Clean Architecture style)
// - bootstrap: configuration and startup wiring
// - infrastructure: store construction (server / embedded) and SQL repositories
// - presentation: auth HTTP handlers, remote procedures and routing
// - application: use cases, ports, DTO validation, credentials
// - domain: core models
// - client: remote procedure client and health monitor for native apps

pub mod application;
pub mod bootstrap;
pub mod client;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

#[cfg(test)]
pub(crate) mod test_support;
