pub mod dispatch;
pub mod load;
pub mod review;
pub mod save;
pub mod stations;

pub use dispatch::dispatch;
