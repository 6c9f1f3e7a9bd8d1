mod receiver;

pub use receiver::*;
