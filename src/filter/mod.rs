pub mod kernel;
pub mod pointwise;

use crate::grid::{Grid, Rgb, BLACK, WHITE};

use kernel::Kernel;

/// Channel response an edge pixel must exceed, in every channel, to be
/// drawn white.
pub const EDGE_THRESHOLD: i32 = 80;

/// Convolves every pixel of `source` with `kernel`, per channel.
///
/// Taps that fall outside the image read the nearest edge pixel. Each
/// channel is accumulated in floating point and truncated toward zero once
/// the whole kernel has been summed; a sum within rounding noise of an
/// integer is taken as that integer. Results are not clamped, so they may
/// fall outside [0, 255].
pub fn convolve(source: &Grid, kernel: &Kernel) -> Grid {
	if source.is_empty() {
		return source.clone();
	}
	Grid::from_fn(source.width(), source.height(), |row, col| {
		convolve_at(source, kernel, row, col)
	})
}

fn convolve_at(source: &Grid, kernel: &Kernel, row: usize, col: usize) -> Rgb {
	let r = kernel.radius() as isize;
	let mut acc = [0f64; 3];
	for dy in 0..kernel.size() {
		for dx in 0..kernel.size() {
			let w = kernel.weight(dy, dx);
			let tap = source.get_clamped(
				row as isize + dy as isize - r,
				col as isize + dx as isize - r,
			);
			if let Some(px) = tap {
				for (a, &c) in acc.iter_mut().zip(px.iter()) {
					*a += w * c as f64;
				}
			}
		}
	}
	[settle(acc[0]), settle(acc[1]), settle(acc[2])]
}

/// Largest distance from an integer still treated as accumulated rounding
/// error of fractional weights like 1/9.
const SNAP_EPSILON: f64 = 1e-9;

/// Truncates an accumulated response toward zero, first snapping it to the
/// nearest integer when it is within `SNAP_EPSILON` of one.
#[inline]
fn settle(sum: f64) -> i32 {
	let nearest = sum.round();
	if (sum - nearest).abs() < SNAP_EPSILON { nearest as i32 } else { sum as i32 }
}

pub fn sharpen(source: &Grid) -> Grid {
	convolve(source, &Kernel::sharpen())
}

/// Binary edge map using the default `EDGE_THRESHOLD`.
pub fn edge_detect(source: &Grid) -> Grid {
	edge_detect_with(source, EDGE_THRESHOLD)
}

/// Convolves with the edge kernel, then draws a pixel white only if all
/// three channel responses are strictly greater than `threshold`, and black
/// otherwise.
pub fn edge_detect_with(source: &Grid, threshold: i32) -> Grid {
	let edge = Kernel::edge();
	if source.is_empty() {
		return source.clone();
	}
	Grid::from_fn(source.width(), source.height(), |row, col| {
		let response = convolve_at(source, &edge, row, col);
		if response.iter().all(|&c| c > threshold) { WHITE } else { BLACK }
	})
}
