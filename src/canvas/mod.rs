//! Serialization of a [`Figure`] into one of the supported canvas formats.

mod pdf;
mod png;
mod svg;

pub use pdf::PdfBackend;

use crate::figure::Figure;
use mime::Mime;
use serde::{Deserialize, Deserializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use tracing::{instrument, trace};

/// Name of the query parameter selecting the output format.
pub const FORMAT_PARAM: &str = "canvas_format";

#[derive(Debug, Error)]
pub enum RenderError {
	#[error("failed to draw figure as SVG: {0}")]
	Svg(String),
	#[error("failed to rasterize figure: {0}")]
	Raster(String),
	#[error(transparent)]
	Png(#[from] image::ImageError),
	#[error("failed to draw figure as PDF: {0}")]
	Pdf(String),
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CanvasFormat {
	#[default]
	Png,
	Svg,
	Pdf,
}

impl CanvasFormat {
	pub const ALL: [Self; 3] = [Self::Pdf, Self::Png, Self::Svg];

	/// Picks the format requested by a `canvas_format` value.
	///
	/// Absent or unrecognized values select the default PNG format.
	pub fn from_query(value: Option<&str>) -> Self {
		value.and_then(|v| v.parse().ok()).unwrap_or_default()
	}

	pub fn mime(self) -> Mime {
		match self {
			Self::Png => mime::IMAGE_PNG,
			Self::Svg => mime::IMAGE_SVG,
			Self::Pdf => mime::APPLICATION_PDF,
		}
	}

	pub const fn extension(self) -> &'static str {
		match self {
			Self::Png => "png",
			Self::Svg => "svg",
			Self::Pdf => "pdf",
		}
	}
}

impl Display for CanvasFormat {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.extension())
	}
}

#[derive(Debug, Error)]
#[error("`{0}` is not a supported canvas format")]
pub struct ParseCanvasFormatError(String);

impl FromStr for CanvasFormat {
	type Err = ParseCanvasFormatError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"png" => Ok(Self::Png),
			"svg" => Ok(Self::Svg),
			"pdf" => Ok(Self::Pdf),
			_ => Err(ParseCanvasFormatError(s.to_owned())),
		}
	}
}

impl<'de> Deserialize<'de> for CanvasFormat {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

/// Encodes the figure in the requested format.
#[instrument(skip_all, fields(figure = %figure.id(), format = %format))]
pub fn print_figure(figure: &Figure, format: CanvasFormat) -> Result<Vec<u8>, RenderError> {
	trace!("Rendering figure");
	let output = match format {
		CanvasFormat::Svg => svg::render(figure)?.into_bytes(),
		CanvasFormat::Png => png::render(figure)?,
		CanvasFormat::Pdf => pdf::render(figure)?,
	};
	trace!(bytes = output.len(), "Rendered figure");
	Ok(output)
}
