mod bit;
pub use bit::*;

pub mod input;
pub mod toast;

mod ribbit_communication;
pub use ribbit_communication::*;

#[cfg(any(target_arch = "wasm32", test))]
mod window_resizing;
