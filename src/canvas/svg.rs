use crate::canvas::RenderError;
use crate::figure::{replay, Figure};
use plotters::prelude::SVGBackend;

/// Renders the figure as a standalone SVG document sized in pixels.
pub fn render(figure: &Figure) -> Result<String, RenderError> {
	let mut document = String::new();
	{
		let mut backend = SVGBackend::with_string(&mut document, figure.size());
		replay(&figure.ops(), &mut backend).map_err(|e| RenderError::Svg(e.to_string()))?;
	}
	Ok(document)
}
