use image::error::ImageError;

use quadtree_filters::node::error::BuildError;
use quadtree_filters::{run, Filter, FilterError, Grid, Settings};

use std::path::Path;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Helper function for `main`.
fn error_exit(msg: &str, code: i32) -> ! {
	eprintln!("{}", msg);
	std::process::exit(code)
}

/// Exit code for a failed filter run: bad flag values are argument errors,
/// an image the tree can't cover is invalid image data.
fn filter_exit_code(e: &FilterError) -> i32 {
	match e {
		FilterError::Build(BuildError::InvalidThreshold(_)) => 2,
		FilterError::Build(BuildError::EmptyGrid { .. }) => 4,
		FilterError::Render(_) => 2,
	}
}

/// Parses an optional numeric flag, falling back to `default`.
fn numeric_arg<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str, default: T) -> T {
	match matches.value_of(name) {
		None => default,
		Some(v) => match v.parse() {
			Ok(n) => n,
			Err(_) => error_exit(&format!("Non-numeric value for {}", name), 2),
		},
	}
}

/// `clap`-based CLI for applying quadtree and convolution filters to images.
///
/// May exit process with status code if there are errors:
///
/// 1: `clap` error
///
/// 2: invalid arguments
///
/// 3: file I/O issues
///
/// 4: invalid image data
///
/// 5: computation limits exceeded
///
/// 10: other, potentially unknown error
fn main() {
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "quadtree_filters=info".into()),
		)
		.with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
		.init();

	let clap_matches = clap::App::new("quadtree_filters")
		.version("0.1.0")
		.author("vkcz")
		.about("Applies quadtree outline/compression, sharpen, edge and color filters to images.")
		.arg_from_usage("-m, --mode=[MODE] 'One of outline, outline-compressed, flat, compress, sharpen, edges, grayscale, identity; defaults to outline'")
		.arg_from_usage("-t, --threshold=[N] 'Mean squared error above which a quadrant is split; defaults to 100'")
		.arg_from_usage("-c, --compression=[RATIO] 'Share of the pixel count kept by compress mode; defaults to 0.02'")
		.arg_from_usage("-e, --edge=[N] 'Channel response needed for an edge pixel (edges mode only); defaults to 80'")
		.arg_from_usage("<INPUT> 'Path to input image'")
		.arg_from_usage("[OUTPUT] 'Path to output image; defaults to INPUT with the mode appended, as PNG'")
		.get_matches();

	let filter: Filter = match clap_matches.value_of("mode").unwrap_or("outline").parse() {
		Ok(f) => f,
		Err(e) => error_exit(&e.to_string(), 2),
	};
	let settings = Settings {
		threshold: numeric_arg(&clap_matches, "threshold", Settings::DEFAULT_THRESHOLD),
		compression: numeric_arg(&clap_matches, "compression", Settings::DEFAULT_COMPRESSION),
		edge_threshold: numeric_arg(&clap_matches, "edge", Settings::default().edge_threshold),
	};

	// `INPUT` is a required argument, so clap has already rejected its absence
	let input_path = clap_matches.value_of("INPUT").unwrap_or_default();
	if !Path::new(input_path).exists() {
		error_exit(&format!("{} not found", input_path), 3);
	}
	let source = match image::open(input_path) {
		Ok(i) => i,
		Err(e) => {
			let (msg, code) = match e {
				ImageError::Decoding(_) | ImageError::Unsupported(_) => ("Invalid image data", 4),
				ImageError::Limits(_) => ("Computation limits exceeded", 5),
				ImageError::IoError(_) => ("File not found or could not be read", 3),
				_ => ("An error occurred", 10),
			};
			error_exit(&format!("{}: {}", msg, e), code)
		}
	}.into_rgb8();
	let grid = Grid::from_rgb_image(&source);

	let output = match run(filter, &grid, &settings) {
		Ok(o) => o,
		Err(e) => error_exit(&e.to_string(), filter_exit_code(&e)),
	};
	match output.leaf_count {
		Some(leaves) => info!(%filter, width = grid.width(), height = grid.height(), leaves, "done"),
		None => info!(%filter, width = grid.width(), height = grid.height(), "done"),
	}

	let default_output = format!("{}_{}.png", input_path.rsplitn(2, '.').last().unwrap_or(input_path), filter);
	let output_path = clap_matches.value_of("OUTPUT").unwrap_or(&default_output);
	match output.image.to_rgb_image().save(output_path) {
		Ok(_) => (),
		Err(ImageError::Unsupported(_)) => error_exit("Unsupported output format", 2),
		Err(_) => error_exit("Could not save output", 3),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use quadtree_filters::node::error::RenderError;

	#[test]
	fn nan_threshold_is_an_argument_error() {
		let settings = Settings { threshold: f64::NAN, ..Settings::default() };
		let err = run(Filter::Flat, &Grid::new(2, 2), &settings).unwrap_err();
		assert_eq!(filter_exit_code(&err), 2);
	}

	#[test]
	fn empty_image_is_invalid_data() {
		let err = run(Filter::Outline, &Grid::new(0, 3), &Settings::default()).unwrap_err();
		assert_eq!(filter_exit_code(&err), 4);
		assert_eq!(filter_exit_code(&RenderError::InvalidRatio(f64::INFINITY).into()), 2);
	}
}
