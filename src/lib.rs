pub mod error;
pub mod flowmon;
pub mod mobility;
pub mod net;
pub mod routing;
pub mod scenario;
pub mod sim;
pub mod topo;
pub mod traffic;

pub use error::ScenarioError;

#[cfg(test)]
mod test;
