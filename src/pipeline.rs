use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::filter::{edge_detect_with, pointwise, sharpen, EDGE_THRESHOLD};
use crate::grid::Grid;
use crate::node::error::{BuildError, RenderError};
use crate::node::render::RenderMode;
use crate::node::Quadtree;

/// Any failure while running a filter.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
	#[error(transparent)]
	Build(#[from] BuildError),
	#[error(transparent)]
	Render(#[from] RenderError),
}

/// Tunable values for a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
	/// Mean squared error above which a region is split.
	pub threshold: f64,
	/// Target share of the pixel count for `Filter::Compress`.
	pub compression: f64,
	/// Response each channel must exceed for `Filter::Edges` to draw white.
	pub edge_threshold: i32,
}

impl Settings {
	pub const DEFAULT_THRESHOLD: f64 = 100.0;
	pub const DEFAULT_COMPRESSION: f64 = 0.02;
}

impl Default for Settings {
	fn default() -> Self {
		Settings {
			threshold: Self::DEFAULT_THRESHOLD,
			compression: Self::DEFAULT_COMPRESSION,
			edge_threshold: EDGE_THRESHOLD,
		}
	}
}

/// Transform applied to an image by `run`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
	/// Source pixels with black quadtree outlines.
	Outline,
	/// Leaf averages with black quadtree outlines.
	OutlineCompressed,
	/// Leaf averages.
	Flat,
	/// One level of the tree, chosen from `Settings::compression`.
	Compress,
	Sharpen,
	Edges,
	Grayscale,
	Identity,
}

impl Filter {
	pub const ALL: [Filter; 8] = [
		Filter::Outline,
		Filter::OutlineCompressed,
		Filter::Flat,
		Filter::Compress,
		Filter::Sharpen,
		Filter::Edges,
		Filter::Grayscale,
		Filter::Identity,
	];

	/// Whether the filter needs a quadtree of the image.
	pub fn needs_tree(self) -> bool {
		matches!(self, Filter::Outline | Filter::OutlineCompressed | Filter::Flat | Filter::Compress)
	}

	pub fn name(self) -> &'static str {
		match self {
			Filter::Outline => "outline",
			Filter::OutlineCompressed => "outline-compressed",
			Filter::Flat => "flat",
			Filter::Compress => "compress",
			Filter::Sharpen => "sharpen",
			Filter::Edges => "edges",
			Filter::Grayscale => "grayscale",
			Filter::Identity => "identity",
		}
	}
}

impl fmt::Display for Filter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Error for an unrecognised filter name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown filter `{0}`")]
pub struct UnknownFilter(pub String);

impl FromStr for Filter {
	type Err = UnknownFilter;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Filter::ALL.iter()
			.copied()
			.find(|f| f.name() == s)
			.ok_or_else(|| UnknownFilter(s.to_owned()))
	}
}

/// Result of `run`: the new image, plus the tree's leaf count when one was
/// built.
#[derive(Clone, Debug, PartialEq)]
pub struct Output {
	pub image: Grid,
	pub leaf_count: Option<usize>,
}

/// Applies `filter` to `source`. A quadtree is only built for filters that
/// use one.
pub fn run(filter: Filter, source: &Grid, settings: &Settings) -> Result<Output, FilterError> {
	if filter.needs_tree() {
		let tree = Quadtree::build(source, settings.threshold)?;
		let image = match filter {
			Filter::Outline => tree.render(RenderMode::OutlinedOriginal, source)?,
			Filter::OutlineCompressed => tree.render(RenderMode::Outlined, source)?,
			Filter::Compress => tree.render_at_ratio(settings.compression, source)?,
			_ => tree.render(RenderMode::Flat, source)?,
		};
		debug!(%filter, leaves = tree.leaf_count(), depth = tree.depth(), "applied tree filter");
		return Ok(Output { image, leaf_count: Some(tree.leaf_count()) });
	}

	let image = match filter {
		Filter::Sharpen => sharpen(source),
		Filter::Edges => edge_detect_with(source, settings.edge_threshold),
		Filter::Grayscale => pointwise::grayscale(source),
		_ => pointwise::identity(source),
	};
	debug!(%filter, "applied pixel filter");
	Ok(Output { image, leaf_count: None })
}
