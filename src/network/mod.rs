pub mod buffer;
pub mod network;
pub mod serialize;
pub mod spec;

pub use buffer::ParameterBuffer;
pub use network::Network;
pub use spec::NetworkSpec;
