pub mod host;

pub use host::{FrameHost, RunResult};
