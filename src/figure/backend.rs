use crate::figure::style::{Rgba, Stroke, TextSpec};
use plotters_backend::{
	BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
};
use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};

/// A single primitive drawn onto a [`crate::figure::Figure`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
	Pixel {
		at: BackendCoord,
		color: Rgba,
	},
	Line {
		from: BackendCoord,
		to: BackendCoord,
		stroke: Stroke,
	},
	Rect {
		upper_left: BackendCoord,
		bottom_right: BackendCoord,
		stroke: Stroke,
		fill: bool,
	},
	Path {
		points: Vec<BackendCoord>,
		stroke: Stroke,
	},
	Circle {
		center: BackendCoord,
		radius: u32,
		stroke: Stroke,
		fill: bool,
	},
	Polygon {
		points: Vec<BackendCoord>,
		stroke: Stroke,
	},
	Text {
		text: String,
		style: TextSpec,
		at: BackendCoord,
	},
}

pub(crate) type OpList = Arc<Mutex<Vec<DrawOp>>>;

/// Plotters backend that records every primitive instead of rasterizing it.
///
/// The recorded operations are shared with the owning figure and replayed onto
/// a concrete backend once the output format is known.
pub struct FigureBackend {
	size: (u32, u32),
	ops: OpList,
}

impl FigureBackend {
	pub(crate) const fn new(size: (u32, u32), ops: OpList) -> Self {
		Self { size, ops }
	}

	fn record(&self, op: DrawOp) {
		self.ops
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(op);
	}
}

impl DrawingBackend for FigureBackend {
	type ErrorType = Infallible;

	fn get_size(&self) -> (u32, u32) {
		self.size
	}

	fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
		Ok(())
	}

	fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
		Ok(())
	}

	fn draw_pixel(
		&mut self,
		point: BackendCoord,
		color: BackendColor,
	) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
		self.record(DrawOp::Pixel {
			at: point,
			color: color.into(),
		});
		Ok(())
	}

	fn draw_line<S: BackendStyle>(
		&mut self,
		from: BackendCoord,
		to: BackendCoord,
		style: &S,
	) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
		self.record(DrawOp::Line {
			from,
			to,
			stroke: Stroke::capture(style),
		});
		Ok(())
	}

	fn draw_rect<S: BackendStyle>(
		&mut self,
		upper_left: BackendCoord,
		bottom_right: BackendCoord,
		style: &S,
		fill: bool,
	) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
		self.record(DrawOp::Rect {
			upper_left,
			bottom_right,
			stroke: Stroke::capture(style),
			fill,
		});
		Ok(())
	}

	fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
		&mut self,
		path: I,
		style: &S,
	) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
		self.record(DrawOp::Path {
			points: path.into_iter().collect(),
			stroke: Stroke::capture(style),
		});
		Ok(())
	}

	fn draw_circle<S: BackendStyle>(
		&mut self,
		center: BackendCoord,
		radius: u32,
		style: &S,
		fill: bool,
	) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
		self.record(DrawOp::Circle {
			center,
			radius,
			stroke: Stroke::capture(style),
			fill,
		});
		Ok(())
	}

	fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
		&mut self,
		vert: I,
		style: &S,
	) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
		self.record(DrawOp::Polygon {
			points: vert.into_iter().collect(),
			stroke: Stroke::capture(style),
		});
		Ok(())
	}

	fn draw_text<TStyle: BackendTextStyle>(
		&mut self,
		text: &str,
		style: &TStyle,
		pos: BackendCoord,
	) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
		self.record(DrawOp::Text {
			text: text.to_owned(),
			style: TextSpec::capture(style),
			at: pos,
		});
		Ok(())
	}
}

/// Draws the recorded operations onto `backend`, in recording order.
pub fn replay<DB: DrawingBackend>(
	ops: &[DrawOp],
	backend: &mut DB,
) -> Result<(), DrawingErrorKind<DB::ErrorType>> {
	backend.ensure_prepared()?;
	for op in ops {
		match op {
			DrawOp::Pixel { at, color } => backend.draw_pixel(*at, (*color).into())?,
			DrawOp::Line { from, to, stroke } => backend.draw_line(*from, *to, stroke)?,
			DrawOp::Rect {
				upper_left,
				bottom_right,
				stroke,
				fill,
			} => backend.draw_rect(*upper_left, *bottom_right, stroke, *fill)?,
			DrawOp::Path { points, stroke } => backend.draw_path(points.iter().copied(), stroke)?,
			DrawOp::Circle {
				center,
				radius,
				stroke,
				fill,
			} => backend.draw_circle(*center, *radius, stroke, *fill)?,
			DrawOp::Polygon { points, stroke } => {
				backend.fill_polygon(points.iter().copied(), stroke)?;
			}
			DrawOp::Text { text, style, at } => backend.draw_text(text, style, *at)?,
		}
	}
	backend.present()
}

#[cfg(test)]
mod tests {
	use super::*;
	use plotters::prelude::*;

	#[test]
	fn records_drawing_area_primitives() {
		let ops = OpList::default();
		let root = FigureBackend::new((100, 80), Arc::clone(&ops)).into_drawing_area();
		root.fill(&WHITE).unwrap();
		root.draw(&Circle::new((10, 10), 5, RED.filled())).unwrap();
		root.draw(&PathElement::new(vec![(0, 0), (50, 40)], BLUE))
			.unwrap();
		drop(root);

		let ops = ops.lock().unwrap();
		assert!(matches!(ops[0], DrawOp::Rect { fill: true, .. }));
		assert!(ops.iter().any(|op| matches!(
			op,
			DrawOp::Circle {
				radius: 5,
				fill: true,
				..
			}
		)));
		assert!(ops
			.iter()
			.any(|op| matches!(op, DrawOp::Path { points, .. } if points.len() == 2)));
	}

	#[test]
	fn replay_reproduces_recording() {
		let source = OpList::default();
		{
			let root = FigureBackend::new((64, 48), Arc::clone(&source)).into_drawing_area();
			root.fill(&WHITE).unwrap();
			root.draw(&Text::new("label", (5, 5), ("sans-serif", 12)))
				.unwrap();
		}

		let copy = OpList::default();
		let mut backend = FigureBackend::new((64, 48), Arc::clone(&copy));
		replay(&source.lock().unwrap(), &mut backend).unwrap();

		assert_eq!(*source.lock().unwrap(), *copy.lock().unwrap());
	}
}
