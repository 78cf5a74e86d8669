use std::collections::VecDeque;

use super::error::RenderError;
use super::{Quadtree, QuadtreeNode, Region};
use crate::grid::{Grid, Rgb, BLACK};

use tracing::debug;

/// How leaves are painted by `render`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
	/// Every pixel of a leaf gets the leaf's average color.
	Flat,
	/// Leaf average inside, black one-pixel outline around each leaf.
	Outlined,
	/// Source pixels inside, black one-pixel outline around each leaf.
	OutlinedOriginal,
}

/// Depth-first walk over the leaves of a tree.
pub struct Leaves<'a> {
	stack: Vec<&'a QuadtreeNode>,
}

impl<'a> Iterator for Leaves<'a> {
	type Item = &'a QuadtreeNode;

	fn next(&mut self) -> Option<Self::Item> {
		while let Some(node) = self.stack.pop() {
			match &node.sections {
				Some(sects) => self.stack.extend(sects.iter()),
				None => return Some(node),
			}
		}
		None
	}
}

/// Breadth-first walk over nodes, optionally stopping at a given level.
pub struct Nodes<'a> {
	queue: VecDeque<&'a QuadtreeNode>,
	level: Option<u32>,
}

impl<'a> Iterator for Nodes<'a> {
	type Item = &'a QuadtreeNode;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let node = self.queue.pop_front()?;
			let below = self.level.map_or(true, |l| node.level < l);
			if below {
				if let Some(sects) = &node.sections {
					self.queue.extend(sects.iter());
				}
			}
			if self.level.map_or(true, |l| node.level == l) {
				return Some(node);
			}
		}
	}
}

impl Quadtree {
	/// Every leaf, each exactly once.
	pub fn leaves(&self) -> Leaves<'_> {
		Leaves { stack: vec![&self.root] }
	}

	/// Every node, root first, level by level.
	pub fn nodes(&self) -> Nodes<'_> {
		Nodes { queue: VecDeque::from(vec![&self.root]), level: None }
	}

	/// Every node whose level is exactly `level`, leaf or not.
	pub fn nodes_at_level(&self, level: u32) -> Nodes<'_> {
		Nodes { queue: VecDeque::from(vec![&self.root]), level: Some(level) }
	}

	/// Paints every leaf into a new grid the size of `source`.
	///
	/// `source` must be the image the tree was built from; it supplies the
	/// interior pixels for `RenderMode::OutlinedOriginal`.
	pub fn render(&self, mode: RenderMode, source: &Grid) -> Result<Grid, RenderError> {
		self.check_dimensions(source)?;
		let mut out = Grid::new(source.width(), source.height());
		for leaf in self.leaves() {
			match mode {
				RenderMode::Flat => fill(&mut out, leaf.region, |_, _| leaf.color),
				RenderMode::Outlined => outline(&mut out, leaf.region, |_, _| leaf.color),
				RenderMode::OutlinedOriginal => outline(&mut out, leaf.region, |row, col| source[(row, col)]),
			}
		}
		Ok(out)
	}

	/// Paints the nodes of one level of the tree, chosen so the number of
	/// regions approximates `ratio` times the pixel count.
	///
	/// Nodes at the chosen depth are painted with their average color even if
	/// the adaptive build split them further. Parts of the image where the
	/// tree stops short of that depth stay black.
	pub fn render_at_ratio(&self, ratio: f64, source: &Grid) -> Result<Grid, RenderError> {
		if !ratio.is_finite() {
			return Err(RenderError::InvalidRatio(ratio));
		}
		self.check_dimensions(source)?;
		let depth = compression_level_to_depth(ratio, source.len());
		let mut out = Grid::new(source.width(), source.height());
		let mut painted = 0usize;
		for node in self.nodes_at_level(depth) {
			fill(&mut out, node.region, |_, _| node.color);
			painted += 1;
		}
		debug!(ratio, depth, painted, "rendered quadtree level");
		Ok(out)
	}

	fn check_dimensions(&self, source: &Grid) -> Result<(), RenderError> {
		let tree = self.dimensions();
		let grid = (source.width(), source.height());
		if tree != grid {
			return Err(RenderError::DimensionMismatch { tree, grid });
		}
		Ok(())
	}
}

/// Smallest `k >= 0` such that `4^k / pixels >= ratio`.
///
/// A level-`k` cut of a complete quadtree has `4^k` regions, so this is the
/// shallowest level whose region count reaches the requested share of the
/// pixel budget.
pub fn compression_level_to_depth(ratio: f64, pixels: usize) -> u32 {
	let pixels = pixels as f64;
	let mut k = 0;
	// 4^k overflows to infinity well before u32 does, which ends the loop
	while 4f64.powi(k as i32) / pixels < ratio {
		k += 1;
	}
	k
}

/// Shorthand for `Quadtree::render`.
pub fn render(tree: &Quadtree, mode: RenderMode, source: &Grid) -> Result<Grid, RenderError> {
	tree.render(mode, source)
}

/// Shorthand for `Quadtree::render_at_ratio`.
pub fn render_at_ratio(tree: &Quadtree, ratio: f64, source: &Grid) -> Result<Grid, RenderError> {
	tree.render_at_ratio(ratio, source)
}

fn fill(out: &mut Grid, region: Region, color: impl Fn(usize, usize) -> Rgb) {
	for (row, col) in region.coords() {
		out.set(row, col, color(row, col));
	}
}

fn outline(out: &mut Grid, region: Region, interior: impl Fn(usize, usize) -> Rgb) {
	for (row, col) in region.coords() {
		let c = if region.on_border(row, col) { BLACK } else { interior(row, col) };
		out.set(row, col, c);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn gradient(width: usize, height: usize) -> Grid {
		Grid::from_fn(width, height, |row, col| {
			[(row * 16 + col) as i32, (255 - row * 16) as i32, (col * 3) as i32]
		})
	}

	#[test]
	fn unsplit_tree_renders_global_average() {
		let grid = Grid::from_vec(2, 2, vec![[0, 10, 255], [1, 20, 255], [2, 30, 0], [3, 41, 0]]).unwrap();
		let tree = Quadtree::build(&grid, f64::INFINITY).unwrap();
		let out = tree.render(RenderMode::Flat, &grid).unwrap();
		assert_eq!(out, Grid::filled(2, 2, [1, 25, 127]));
	}

	#[test]
	fn zero_threshold_reproduces_source() {
		let grid = gradient(8, 8);
		let tree = Quadtree::build(&grid, 0.0).unwrap();
		assert!(tree.leaves().all(|l| l.region.area() == 1));
		assert_eq!(tree.leaf_count(), 64);
		assert_eq!(tree.render(RenderMode::Flat, &grid).unwrap(), grid);
	}

	#[test]
	fn dfs_and_bfs_agree_on_leaves() {
		let grid = gradient(12, 7);
		let tree = Quadtree::build(&grid, 40.0).unwrap();
		let mut dfs: Vec<Region> = tree.leaves().map(|n| n.region).collect();
		let mut bfs: Vec<Region> = tree.nodes().filter(|n| n.is_leaf()).map(|n| n.region).collect();
		let key = |r: &Region| (r.row, r.col);
		dfs.sort_by_key(key);
		bfs.sort_by_key(key);
		assert_eq!(dfs, bfs);
		assert_eq!(dfs.len(), tree.leaf_count());
	}

	#[test]
	fn outlines_are_black_and_win_over_interior() {
		let grid = Grid::filled(4, 4, [9, 9, 9]);
		let tree = Quadtree::build(&grid, f64::INFINITY).unwrap();

		let out = tree.render(RenderMode::Outlined, &grid).unwrap();
		for (row, col) in Region::new(0, 0, 4, 4).coords() {
			let interior = (1..3).contains(&row) && (1..3).contains(&col);
			let expected = if interior { [9, 9, 9] } else { BLACK };
			assert_eq!(out[(row, col)], expected, "pixel ({}, {})", row, col);
		}
	}

	#[test]
	fn outlined_original_keeps_source_interior() {
		let grid = gradient(5, 5);
		let tree = Quadtree::build(&grid, f64::INFINITY).unwrap();
		let out = tree.render(RenderMode::OutlinedOriginal, &grid).unwrap();
		assert_eq!(out[(2, 2)], grid[(2, 2)]);
		assert_eq!(out[(1, 3)], grid[(1, 3)]);
		assert_eq!(out[(0, 2)], BLACK);
		assert_eq!(out[(4, 4)], BLACK);
	}

	#[test]
	fn compression_depth_boundary() {
		assert_eq!(compression_level_to_depth(0.02, 256), 2);
		assert_eq!(compression_level_to_depth(0.0625, 256), 2);
		assert_eq!(compression_level_to_depth(0.0626, 256), 3);
		assert_eq!(compression_level_to_depth(0.0, 256), 0);
		assert_eq!(compression_level_to_depth(1.0, 256), 4);
	}

	#[test]
	fn ratio_render_paints_nodes_at_exact_depth() {
		let grid = gradient(16, 16);
		let tree = Quadtree::build(&grid, 0.0).unwrap();
		assert_eq!(tree.nodes_at_level(2).count(), 16);
		assert!(tree.nodes_at_level(2).all(|n| !n.is_leaf() && n.region.area() == 16));

		let out = tree.render_at_ratio(0.02, &grid).unwrap();
		for node in tree.nodes_at_level(2) {
			for (row, col) in node.region.coords() {
				assert_eq!(out[(row, col)], node.color);
			}
		}
	}

	#[test]
	fn ratio_render_leaves_shallow_branches_black() {
		// Left half is flat and stops at the root's sections; the right half
		// keeps splitting
		let grid = Grid::from_fn(8, 8, |row, col| {
			if col < 4 { [100, 100, 100] } else { [(row * 30) as i32, (col * 20) as i32, 7] }
		});
		let tree = Quadtree::build(&grid, 0.0).unwrap();
		let out = tree.render_at_ratio(16.0 / 64.0, &grid).unwrap();
		assert_eq!(out[(0, 0)], BLACK);
		assert_eq!(out[(7, 3)], BLACK);
		let east = tree.nodes_at_level(2).find(|n| n.region.col == 4 && n.region.row == 0).unwrap();
		assert_eq!(out[(0, 4)], east.color);
	}

	#[test]
	fn mismatched_grid_and_bad_ratio_are_rejected() {
		let tree = Quadtree::build(&gradient(4, 4), 10.0).unwrap();
		assert_eq!(
			tree.render(RenderMode::Flat, &gradient(4, 5)).unwrap_err(),
			RenderError::DimensionMismatch { tree: (4, 4), grid: (4, 5) }
		);
		assert!(matches!(
			tree.render_at_ratio(f64::INFINITY, &gradient(4, 4)),
			Err(RenderError::InvalidRatio(_))
		));
	}
}
