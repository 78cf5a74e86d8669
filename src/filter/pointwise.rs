use crate::grid::{Grid, Rgb};

/// Luma weights used by `ChannelTransform::Grayscale`.
pub const LUMA: [f64; 3] = [0.3, 0.59, 0.11];

/// A per-pixel color transform.
///
/// Each output channel may depend on all three input channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChannelTransform {
	/// Every channel becomes `trunc(0.3 r + 0.59 g + 0.11 b)`.
	Grayscale,
	/// Channels pass through unchanged.
	Identity,
	/// Output channel `i` is `trunc(sum_j coeffs[i][j] * input[j])`.
	Weighted([[f64; 3]; 3]),
}

impl ChannelTransform {
	pub fn apply_pixel(&self, px: Rgb) -> Rgb {
		match self {
			ChannelTransform::Identity => px,
			ChannelTransform::Grayscale => {
				let y = mix(&LUMA, px);
				[y, y, y]
			}
			ChannelTransform::Weighted(coeffs) => [
				mix(&coeffs[0], px),
				mix(&coeffs[1], px),
				mix(&coeffs[2], px),
			],
		}
	}
}

/// Weighted sum of the channels, truncated toward zero.
fn mix(weights: &[f64; 3], px: Rgb) -> i32 {
	(weights[0] * px[0] as f64 + weights[1] * px[1] as f64 + weights[2] * px[2] as f64) as i32
}

/// Applies `transform` to every pixel of `source` into a new grid.
pub fn apply(source: &Grid, transform: ChannelTransform) -> Grid {
	Grid::from_fn(source.width(), source.height(), |row, col| {
		transform.apply_pixel(source[(row, col)])
	})
}

pub fn grayscale(source: &Grid) -> Grid {
	apply(source, ChannelTransform::Grayscale)
}

pub fn identity(source: &Grid) -> Grid {
	apply(source, ChannelTransform::Identity)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn grayscale_truncates_luma() {
		assert_eq!(ChannelTransform::Grayscale.apply_pixel([100, 150, 200]), [140, 140, 140]);
		assert_eq!(ChannelTransform::Grayscale.apply_pixel([255, 255, 255]), [255, 255, 255]);
		assert_eq!(ChannelTransform::Grayscale.apply_pixel([0, 0, 1]), [0, 0, 0]);
	}

	#[test]
	fn identity_copies_grid() {
		let grid = Grid::from_fn(3, 2, |row, col| [row as i32, col as i32, 77]);
		assert_eq!(identity(&grid), grid);
	}

	#[test]
	fn weighted_mixes_across_channels() {
		let swap = ChannelTransform::Weighted([[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]]);
		assert_eq!(swap.apply_pixel([1, 2, 3]), [3, 2, 1]);

		let halve = ChannelTransform::Weighted([[0.5, 0.0, 0.0], [0.0, 0.5, 0.0], [0.0, 0.0, -0.5]]);
		assert_eq!(halve.apply_pixel([5, 9, 3]), [2, 4, -1]);
	}

	#[test]
	fn grayscale_reads_only_the_source() {
		let grid = Grid::from_vec(2, 1, vec![[100, 150, 200], [50, 50, 50]]).unwrap();
		let out = grayscale(&grid);
		assert_eq!(out.pixels(), &[[140; 3], [50; 3]]);
		assert_eq!(grid[(0, 0)], [100, 150, 200]);
	}
}
