//! The drawing surface handed to plotting handlers.
//!
//! A [`Figure`] records whatever is drawn onto its [`Figure::root`] drawing area. The recording is
//! format independent: the canvas adapters in [`crate::canvas`] replay it onto an SVG, raster or
//! PDF backend after the handler returns.

mod backend;
mod style;

pub use backend::{replay, DrawOp, FigureBackend};
pub use style::{Alignment, Anchor, Rgba, Rotation, Slant, Stroke, TextSpec};

use backend::OpList;
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use serde::Deserialize;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, PoisonError};
use uuid::Uuid;

/// Pixels per inch used when no resolution is configured.
pub const DEFAULT_DPI: f64 = 100.0;

/// Figure width and height in inches.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(from = "(f64, f64)")]
pub struct FigSize {
	pub width: f64,
	pub height: f64,
}

impl FigSize {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Canvas size in pixels at the given resolution. Never smaller than one pixel.
	#[allow(
		clippy::cast_possible_truncation,
		clippy::cast_sign_loss
	)]
	pub fn to_pixels(self, dpi: f64) -> (u32, u32) {
		let scale = |inches: f64| (inches * dpi).round().max(1.0) as u32;
		(scale(self.width), scale(self.height))
	}
}

impl Default for FigSize {
	fn default() -> Self {
		Self::new(6.4, 4.8)
	}
}

impl From<(f64, f64)> for FigSize {
	fn from((width, height): (f64, f64)) -> Self {
		Self::new(width, height)
	}
}

/// A recorded plot.
///
/// Cloning a figure yields another handle onto the same recording, so a handler can draw on the
/// copy it was given while the caller keeps its own handle for serialization.
#[derive(Clone)]
pub struct Figure {
	id: Uuid,
	figsize: FigSize,
	dpi: f64,
	ops: OpList,
}

impl Figure {
	pub fn new(figsize: FigSize, dpi: f64) -> Self {
		let figure = Self {
			id: Uuid::new_v4(),
			figsize,
			dpi,
			ops: OpList::default(),
		};
		figure.clear();
		figure
	}

	pub const fn id(&self) -> Uuid {
		self.id
	}

	pub const fn figsize(&self) -> FigSize {
		self.figsize
	}

	pub const fn dpi(&self) -> f64 {
		self.dpi
	}

	/// Canvas width and height in pixels.
	pub fn size(&self) -> (u32, u32) {
		self.figsize.to_pixels(self.dpi)
	}

	/// A drawing area covering the whole figure.
	///
	/// Every call returns a new area over the same recording.
	pub fn root(&self) -> DrawingArea<FigureBackend, Shift> {
		FigureBackend::new(self.size(), Arc::clone(&self.ops)).into_drawing_area()
	}

	/// Discards everything drawn so far, leaving only the white background.
	pub fn clear(&self) {
		let (width, height) = self.size();
		let mut ops = self.ops.lock().unwrap_or_else(PoisonError::into_inner);
		ops.clear();
		ops.push(DrawOp::Rect {
			upper_left: (0, 0),
			bottom_right: (
				i32::try_from(width).unwrap_or(i32::MAX),
				i32::try_from(height).unwrap_or(i32::MAX),
			),
			stroke: Stroke {
				color: Rgba::WHITE,
				width: 0,
			},
			fill: true,
		});
	}

	/// Whether nothing has been drawn besides the background.
	pub fn is_empty(&self) -> bool {
		self.ops.lock().unwrap_or_else(PoisonError::into_inner).len() <= 1
	}

	/// A snapshot of the recorded operations.
	pub fn ops(&self) -> Vec<DrawOp> {
		self.ops
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}
}

impl Default for Figure {
	fn default() -> Self {
		Self::new(FigSize::default(), DEFAULT_DPI)
	}
}

impl Debug for Figure {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Figure")
			.field("id", &self.id)
			.field("figsize", &self.figsize)
			.field("dpi", &self.dpi)
			.finish_non_exhaustive()
	}
}
