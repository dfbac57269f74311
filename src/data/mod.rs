pub mod frame;
pub mod trade;

pub use frame::TimeFrame;
pub use trade::{Action, Holding, Trade};
