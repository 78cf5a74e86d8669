use thiserror::Error;

/// Reason why a quadtree couldn't be built from a grid.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
	/// The grid has no pixels; a region average would divide by zero.
	#[error("cannot build a quadtree from a {width}x{height} image")]
	EmptyGrid { width: usize, height: usize },
	/// The split threshold is NaN, so no error could ever be compared to it.
	#[error("invalid split threshold: {0}")]
	InvalidThreshold(f64),
}

/// Reason why a quadtree couldn't be rendered to a grid.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
	/// The tree was built from an image of a different size.
	#[error("tree covers {}x{} pixels but the image is {}x{}", .tree.0, .tree.1, .grid.0, .grid.1)]
	DimensionMismatch {
		tree: (usize, usize),
		grid: (usize, usize),
	},
	/// The compression ratio is NaN or infinite.
	#[error("invalid compression ratio: {0}")]
	InvalidRatio(f64),
}
