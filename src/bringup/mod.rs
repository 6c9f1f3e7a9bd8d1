mod init;
mod queue;

pub use init::*;
pub use queue::*;
