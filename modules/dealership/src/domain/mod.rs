pub mod error;
pub mod models;
pub mod platform;
pub mod repo;
pub mod service;
pub mod tenant_resolver;

#[cfg(test)]
mod tenant_resolver_test;
