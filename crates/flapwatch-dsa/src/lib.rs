#![no_std]
extern crate alloc;

pub mod weights;
pub mod window;

pub use weights::WeightProfile;
pub use window::FlapWindow;
