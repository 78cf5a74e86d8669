pub mod filter;
pub mod grid;
pub mod node;
pub mod pipeline;

pub use node::*;

pub use filter::kernel::{Kernel, KernelError};
pub use filter::pointwise::{grayscale, identity, ChannelTransform};
pub use filter::{convolve, edge_detect, edge_detect_with, sharpen};
pub use grid::{Grid, Rgb};
pub use node::render::{compression_level_to_depth, render, render_at_ratio, RenderMode};
pub use pipeline::{run, Filter, FilterError, Output, Settings};
