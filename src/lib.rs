pub mod assets;
pub mod camera;
pub mod gallery;
pub mod gpu;
pub mod layout;
pub mod morph;
pub mod motion;
pub mod picking;
pub mod readout;
pub mod settings;
pub mod surface;
pub mod transition;
pub mod wave;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

#[cfg(target_arch = "wasm32")]
pub mod wasm;
