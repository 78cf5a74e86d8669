pub mod error;
pub mod render;

use crate::grid::{Grid, Rgb};

use tracing::debug;

/// Axis-aligned rectangle of pixels: top-left corner plus size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
	pub row: usize,
	pub col: usize,
	pub width: usize,
	pub height: usize,
}

impl Region {
	pub fn new(row: usize, col: usize, width: usize, height: usize) -> Self {
		Self { row, col, width, height }
	}

	/// Number of pixels covered.
	pub fn area(&self) -> usize {
		self.width * self.height
	}

	/// Whether `(row, col)` lies on the first or last row or column.
	pub fn on_border(&self, row: usize, col: usize) -> bool {
		row == self.row || row + 1 == self.row + self.height ||
			col == self.col || col + 1 == self.col + self.width
	}

	/// Splits into north-west, north-east, south-west and south-east
	/// quadrants. The east and south halves take the extra pixel of an odd
	/// width or height, so the four always tile `self` exactly.
	pub fn quadrants(&self) -> [Region; 4] {
		let mid_w = self.width / 2;
		let mid_h = self.height / 2;
		[
			Region::new(self.row, self.col, mid_w, mid_h),
			Region::new(self.row, self.col + mid_w, self.width - mid_w, mid_h),
			Region::new(self.row + mid_h, self.col, mid_w, self.height - mid_h),
			Region::new(self.row + mid_h, self.col + mid_w, self.width - mid_w, self.height - mid_h),
		]
	}

	/// Iterates over every `(row, col)` in the region, row by row.
	pub fn coords(&self) -> impl Iterator<Item = (usize, usize)> {
		let Region { row, col, width, height } = *self;
		(row..row + height).flat_map(move |r| (col..col + width).map(move |c| (r, c)))
	}
}

/// Node in a quadtree covering one region of an image.
///
/// May contain subnodes (branch node) or no subnodes (leaf node). Every node
/// keeps the average color of its region, so descent can stop at any level
/// and still give a meaningful picture.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadtreeNode {
	pub region: Region,
	/// Depth in the tree; the root is 0.
	pub level: u32,
	pub color: Rgb,
	/// North-west, north-east, south-west, south-east.
	pub sections: Option<Box<[QuadtreeNode; 4]>>,
}

impl QuadtreeNode {
	pub fn is_leaf(&self) -> bool {
		self.sections.is_none()
	}

	/// Builds the subtree for `region`, splitting while the region's mean
	/// squared error is above `threshold`.
	///
	/// `leaves` is bumped by 3 for every split: the node stops being a leaf
	/// and its four sections become leaves.
	fn grow(grid: &Grid, region: Region, level: u32, threshold: f64, leaves: &mut usize) -> Self {
		let color = mean_color(grid, region);
		let mut node = QuadtreeNode { region, level, color, sections: None };

		// Strips one pixel wide or tall are never split
		if region.width > 1 && region.height > 1 && mean_sq_error(grid, region, color) > threshold {
			*leaves += 3;
			let [nw, ne, sw, se] = region.quadrants();
			node.sections = Some(Box::new([
				Self::grow(grid, nw, level + 1, threshold, leaves),
				Self::grow(grid, ne, level + 1, threshold, leaves),
				Self::grow(grid, sw, level + 1, threshold, leaves),
				Self::grow(grid, se, level + 1, threshold, leaves),
			]));
		}
		node
	}
}

/// A quadtree built over a whole image, with its leaf count.
#[derive(Clone, Debug, PartialEq)]
pub struct Quadtree {
	root: QuadtreeNode,
	leaf_count: usize,
}

impl Quadtree {
	/// Recursively partitions `grid` into quadrants until each quadrant's
	/// mean squared error is at most `threshold`.
	///
	/// An infinite threshold yields a single root leaf; a threshold of zero
	/// splits every non-uniform region down to single pixels or strips.
	pub fn build(grid: &Grid, threshold: f64) -> Result<Self, error::BuildError> {
		if grid.width() == 0 || grid.height() == 0 {
			return Err(error::BuildError::EmptyGrid { width: grid.width(), height: grid.height() });
		}
		if threshold.is_nan() {
			return Err(error::BuildError::InvalidThreshold(threshold));
		}

		let mut leaf_count = 1;
		let region = Region::new(0, 0, grid.width(), grid.height());
		let root = QuadtreeNode::grow(grid, region, 0, threshold, &mut leaf_count);
		debug!(threshold, leaf_count, "built quadtree over {}x{} image", grid.width(), grid.height());
		Ok(Self { root, leaf_count })
	}

	pub fn root(&self) -> &QuadtreeNode {
		&self.root
	}

	pub fn leaf_count(&self) -> usize {
		self.leaf_count
	}

	/// Deepest level present in the tree.
	pub fn depth(&self) -> u32 {
		self.nodes().map(|n| n.level).max().unwrap_or(0)
	}

	/// Width and height of the image the tree was built from.
	pub fn dimensions(&self) -> (usize, usize) {
		(self.root.region.width, self.root.region.height)
	}
}

/// Shorthand for `Quadtree::build`.
pub fn build_tree(grid: &Grid, threshold: f64) -> Result<Quadtree, error::BuildError> {
	Quadtree::build(grid, threshold)
}

/// Per-channel integer mean of a region, truncated toward zero.
fn mean_color(grid: &Grid, region: Region) -> Rgb {
	let mut sum = [0i64; 3];
	for (row, col) in region.coords() {
		for (s, &c) in sum.iter_mut().zip(grid[(row, col)].iter()) {
			*s += c as i64;
		}
	}
	let n = region.area() as i64;
	[(sum[0] / n) as i32, (sum[1] / n) as i32, (sum[2] / n) as i32]
}

/// Squared color distance summed across channels, averaged over the region.
fn mean_sq_error(grid: &Grid, region: Region, mean: Rgb) -> f64 {
	let total: f64 = region.coords()
		.map(|(row, col)| {
			grid[(row, col)].iter().zip(mean.iter()).map(|(&c, &m)| {
				let d = (c - m) as f64;
				d * d
			}).sum::<f64>()
		})
		.sum();
	total / region.area() as f64
}
