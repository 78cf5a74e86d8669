use thiserror::Error;

/// One pixel: red, green and blue channels.
///
/// Channels are plain integers so that intermediate results (sums,
/// convolution responses) can leave the [0, 255] range without wrapping.
pub type Rgb = [i32; 3];

pub const BLACK: Rgb = [0, 0, 0];
pub const WHITE: Rgb = [255, 255, 255];

/// Reason why a `Grid` couldn't be made from raw data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
	#[error("grid size mismatch: expected {expected} pixels, got {actual}")]
	SizeMismatch { expected: usize, actual: usize },
}

/// Row-major buffer of RGB pixels, indexed by `(row, col)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
	width: usize,
	height: usize,
	pixels: Vec<Rgb>,
}

impl Grid {
	/// A grid with every pixel set to `color`.
	pub fn filled(width: usize, height: usize, color: Rgb) -> Self {
		Self { width, height, pixels: vec![color; width * height] }
	}

	/// An all-black grid, as every output buffer starts out.
	pub fn new(width: usize, height: usize) -> Self {
		Self::filled(width, height, BLACK)
	}

	pub fn from_vec(width: usize, height: usize, pixels: Vec<Rgb>) -> Result<Self, GridError> {
		let expected = width * height;
		if pixels.len() != expected {
			return Err(GridError::SizeMismatch { expected, actual: pixels.len() });
		}
		Ok(Self { width, height, pixels })
	}

	/// Builds a grid by calling `f(row, col)` for every pixel.
	pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Rgb) -> Self {
		let mut pixels = Vec::with_capacity(width * height);
		for row in 0..height {
			for col in 0..width {
				pixels.push(f(row, col));
			}
		}
		Self { width, height, pixels }
	}

	pub fn width(&self) -> usize {
		self.width
	}

	pub fn height(&self) -> usize {
		self.height
	}

	/// Total number of pixels.
	pub fn len(&self) -> usize {
		self.pixels.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pixels.is_empty()
	}

	pub fn pixels(&self) -> &[Rgb] {
		&self.pixels
	}

	pub fn get(&self, row: usize, col: usize) -> Option<Rgb> {
		if row >= self.height || col >= self.width {
			return None;
		}
		Some(self.pixels[row * self.width + col])
	}

	/// Reads a pixel, replicating the nearest edge pixel for coordinates
	/// outside the grid. `None` only for an empty grid.
	pub fn get_clamped(&self, row: isize, col: isize) -> Option<Rgb> {
		if self.is_empty() {
			return None;
		}
		let row = clamp_index(row, self.height);
		let col = clamp_index(col, self.width);
		Some(self.pixels[row * self.width + col])
	}

	/// Writes a pixel; out-of-bounds writes are ignored.
	pub fn set(&mut self, row: usize, col: usize, color: Rgb) {
		if row < self.height && col < self.width {
			self.pixels[row * self.width + col] = color;
		}
	}

	/// Copies an 8-bit RGB image into a grid.
	pub fn from_rgb_image(img: &image::RgbImage) -> Self {
		let (width, height) = (img.width() as usize, img.height() as usize);
		Self::from_fn(width, height, |row, col| {
			let px = img.get_pixel(col as u32, row as u32).0;
			[px[0] as i32, px[1] as i32, px[2] as i32]
		})
	}

	/// Converts to an 8-bit RGB image, saturating each channel into [0, 255].
	pub fn to_rgb_image(&self) -> image::RgbImage {
		image::RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
			let px = self.pixels[y as usize * self.width + x as usize];
			image::Rgb([saturate(px[0]), saturate(px[1]), saturate(px[2])])
		})
	}
}

impl std::ops::Index<(usize, usize)> for Grid {
	type Output = Rgb;

	fn index(&self, (row, col): (usize, usize)) -> &Rgb {
		assert!(row < self.height && col < self.width, "pixel ({}, {}) out of bounds", row, col);
		&self.pixels[row * self.width + col]
	}
}

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
	if i < 0 { 0 } else { (i as usize).min(len - 1) }
}

#[inline]
fn saturate(c: i32) -> u8 {
	c.max(0).min(255) as u8
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn from_vec_rejects_wrong_length() {
		let err = Grid::from_vec(2, 2, vec![BLACK; 3]).unwrap_err();
		assert_eq!(err, GridError::SizeMismatch { expected: 4, actual: 3 });
	}

	#[test]
	fn clamped_reads_replicate_edges_and_corners() {
		let grid = Grid::from_fn(3, 2, |row, col| [row as i32, col as i32, 0]);

		assert_eq!(grid.get_clamped(-1, -1), Some([0, 0, 0]));
		assert_eq!(grid.get_clamped(-5, 1), Some([0, 1, 0]));
		assert_eq!(grid.get_clamped(1, 7), Some([1, 2, 0]));
		assert_eq!(grid.get_clamped(9, 9), Some([1, 2, 0]));
		assert_eq!(grid.get_clamped(2, -1), Some([1, 0, 0]));
		assert_eq!(grid.get(2, 0), None);
	}

	#[test]
	fn clamped_reads_on_empty_grids_are_none() {
		assert_eq!(Grid::new(0, 0).get_clamped(0, 0), None);
		assert_eq!(Grid::new(3, 0).get_clamped(-1, 1), None);
		assert_eq!(Grid::new(0, 2).get_clamped(1, 5), None);
	}

	#[test]
	fn image_conversion_saturates_out_of_range_channels() {
		let grid = Grid::from_vec(2, 1, vec![[-20, 128, 300], [0, 255, 12]]).unwrap();
		let img = grid.to_rgb_image();

		assert_eq!(img.get_pixel(0, 0).0, [0, 128, 255]);
		assert_eq!(img.get_pixel(1, 0).0, [0, 255, 12]);
		assert_eq!(Grid::from_rgb_image(&img).get(0, 0), Some([0, 128, 255]));
	}
}
