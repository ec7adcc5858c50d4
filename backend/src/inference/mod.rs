pub mod adapter;
pub mod bridge;
pub mod engine;
pub mod http_bridge;
#[cfg(test)]
pub mod mock;
