mod client;
mod device;

pub use client::*;
pub use device::*;
