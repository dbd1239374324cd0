mod converter;
mod encoding;
mod error;

pub use converter::*;
pub use encoding::*;
pub use error::*;
