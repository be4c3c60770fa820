//! 拓扑构建

pub mod hetnet;

pub use hetnet::{CsmaParams, HetNetOpts, HetTopology, PointToPointParams, WifiParams, build_hetnet};
