use thiserror::Error;

/// Reason why a set of weights couldn't be made into a `Kernel`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KernelError {
	#[error("kernel has no weights")]
	Empty,
	#[error("kernel is not square: {rows} rows but row {row} has {len} weights")]
	NotSquare { rows: usize, row: usize, len: usize },
	#[error("kernel size {0} is even; convolution needs a center tap")]
	EvenSize(usize),
	#[error("expected {expected} weights, got {actual}")]
	LengthMismatch { expected: usize, actual: usize },
}

/// Square convolution kernel of odd size, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
	size: usize,
	weights: Vec<f64>,
}

impl Kernel {
	/// Builds a `size` x `size` kernel from row-major weights.
	pub fn from_slice(size: usize, weights: &[f64]) -> Result<Self, KernelError> {
		if size == 0 {
			return Err(KernelError::Empty);
		}
		if size % 2 == 0 {
			return Err(KernelError::EvenSize(size));
		}
		if weights.len() != size * size {
			return Err(KernelError::LengthMismatch { expected: size * size, actual: weights.len() });
		}
		Ok(Self { size, weights: weights.to_vec() })
	}

	/// Builds a kernel from nested rows, which must form an odd-sized square.
	pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, KernelError> {
		let size = rows.len();
		if size == 0 {
			return Err(KernelError::Empty);
		}
		if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.as_ref().len() != size) {
			return Err(KernelError::NotSquare { rows: size, row, len: r.as_ref().len() });
		}
		let weights: Vec<f64> = rows.iter().flat_map(|r| r.as_ref().iter().copied()).collect();
		Self::from_slice(size, &weights)
	}

	/// Center 1, neighbors -1/9.
	pub fn sharpen() -> Self {
		let n = -1.0 / 9.0;
		Self { size: 3, weights: vec![n, n, n, n, 1.0, n, n, n, n] }
	}

	/// Center 8, neighbors -1; responds with 0 to any flat patch.
	pub fn edge() -> Self {
		Self { size: 3, weights: vec![-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0] }
	}

	/// Uniform averaging kernel.
	pub fn box_blur(size: usize) -> Result<Self, KernelError> {
		let w = 1.0 / (size * size) as f64;
		Self::from_slice(size, &vec![w; size * size])
	}

	pub fn size(&self) -> usize {
		self.size
	}

	/// Distance from the center tap to the edge.
	pub fn radius(&self) -> usize {
		self.size / 2
	}

	/// Weight at row `dy`, column `dx`, both counted from the top-left tap.
	#[inline]
	pub fn weight(&self, dy: usize, dx: usize) -> f64 {
		self.weights[dy * self.size + dx]
	}
}
