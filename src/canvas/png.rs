use crate::canvas::{svg, RenderError};
use crate::figure::Figure;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{fontdb, Options, Tree};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Largest raster canvas, in pixels, that will be allocated for a figure.
pub const MAX_PIXELS: u64 = 8192 * 8192;

/// System fonts, loaded once on first use.
fn fonts() -> Arc<fontdb::Database> {
	static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
	Arc::clone(FONTS.get_or_init(|| {
		let mut database = fontdb::Database::new();
		database.load_system_fonts();
		debug!(faces = database.len(), "Loaded system fonts");
		Arc::new(database)
	}))
}

/// Rasterizes the SVG rendition of the figure and encodes it as PNG.
pub fn render(figure: &Figure) -> Result<Vec<u8>, RenderError> {
	let (width, height) = figure.size();
	if u64::from(width) * u64::from(height) > MAX_PIXELS {
		return Err(RenderError::Raster(format!(
			"a {width}x{height} canvas exceeds the limit of {MAX_PIXELS} pixels"
		)));
	}

	let document = svg::render(figure)?;

	let options = Options {
		fontdb: fonts(),
		..Options::default()
	};
	let tree =
		Tree::from_str(&document, &options).map_err(|e| RenderError::Raster(e.to_string()))?;

	let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
		RenderError::Raster(format!("cannot allocate a {width}x{height} canvas"))
	})?;
	resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

	let rgba: Vec<u8> = pixmap
		.pixels()
		.iter()
		.flat_map(|pixel| {
			let color = pixel.demultiply();
			[color.red(), color.green(), color.blue(), color.alpha()]
		})
		.collect();
	let image = RgbaImage::from_raw(width, height, rgba)
		.ok_or_else(|| RenderError::Raster(String::from("pixel buffer size mismatch")))?;

	let mut render_buffer = Vec::new();
	let encoder = PngEncoder::new_with_quality(
		&mut render_buffer,
		CompressionType::default(),
		FilterType::default(),
	);
	DynamicImage::ImageRgba8(image).write_with_encoder(encoder)?;

	Ok(render_buffer)
}
