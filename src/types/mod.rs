pub mod asset;
pub mod candle;
pub mod signal;

pub use asset::*;
pub use candle::*;
pub use signal::*;
