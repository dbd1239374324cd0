mod atomic;
mod basic;
mod facade;
mod interface;
mod lock;
mod mutex;
mod state;
mod status;
#[cfg(test)]
mod tests;

pub use atomic::*;
pub use basic::*;
pub use facade::*;
pub use interface::*;
pub use lock::*;
pub(crate) use mutex::*;
pub use status::*;
