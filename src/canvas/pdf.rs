use crate::canvas::RenderError;
use crate::figure::{replay, Alignment, Figure, Rgba, Stroke, TextSpec};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};
use plotters_backend::{
	BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
};
use std::convert::Infallible;

const POINTS_PER_INCH: f64 = 72.0;
const FONT_NAME: Name<'static> = Name(b"F1");
/// Bezier control point distance for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

/// Renders the figure as a single page PDF document.
pub fn render(figure: &Figure) -> Result<Vec<u8>, RenderError> {
	let mut backend = PdfBackend::new(figure.size(), figure.dpi());
	replay(&figure.ops(), &mut backend).map_err(|e| RenderError::Pdf(e.to_string()))?;
	Ok(backend.finish())
}

/// Plotters backend writing vector PDF content.
///
/// Coordinates are given in canvas pixels with the origin at the top left; they are scaled to
/// points and flipped onto the PDF page, whose origin is at the bottom left. Translucent colors
/// select a graphics state carrying their alpha, and fully transparent shapes are skipped.
pub struct PdfBackend {
	size: (u32, u32),
	scale: f32,
	content: Content,
	/// Alpha of each graphics state `GS<index>` used by the content stream.
	alphas: Vec<f32>,
	alpha: f32,
}

impl PdfBackend {
	#[allow(clippy::cast_possible_truncation)]
	pub fn new(size: (u32, u32), dpi: f64) -> Self {
		Self {
			size,
			scale: (POINTS_PER_INCH / dpi) as f32,
			content: Content::new(),
			alphas: Vec::new(),
			alpha: 1.0,
		}
	}

	#[allow(clippy::cast_precision_loss)]
	fn page_size(&self) -> (f32, f32) {
		(
			self.size.0 as f32 * self.scale,
			self.size.1 as f32 * self.scale,
		)
	}

	#[allow(clippy::cast_precision_loss)]
	fn point(&self, (x, y): BackendCoord) -> (f32, f32) {
		let (_, height) = self.page_size();
		(x as f32 * self.scale, height - y as f32 * self.scale)
	}

	/// Selects the graphics state for `color`'s alpha, registering a new one on first use.
	#[allow(clippy::cast_possible_truncation)]
	fn set_alpha(&mut self, color: Rgba) {
		let alpha = color.alpha.clamp(0.0, 1.0) as f32;
		if (alpha - self.alpha).abs() < f32::EPSILON {
			return;
		}
		let index = self
			.alphas
			.iter()
			.position(|known| (known - alpha).abs() < f32::EPSILON)
			.unwrap_or_else(|| {
				self.alphas.push(alpha);
				self.alphas.len() - 1
			});
		let name = graphics_state_name(index);
		self.content.set_parameters(Name(name.as_bytes()));
		self.alpha = alpha;
	}

	fn set_stroke(&mut self, stroke: &Stroke) {
		self.set_alpha(stroke.color);
		let (r, g, b) = stroke.color.to_unit();
		#[allow(clippy::cast_precision_loss)]
		let width = stroke.width as f32 * self.scale;
		self.content.set_stroke_rgb(r, g, b).set_line_width(width);
	}

	fn set_fill(&mut self, color: Rgba) {
		self.set_alpha(color);
		let (r, g, b) = color.to_unit();
		self.content.set_fill_rgb(r, g, b);
	}

	fn trace_polyline(&mut self, points: &[BackendCoord]) -> bool {
		let Some((first, rest)) = points.split_first() else {
			return false;
		};
		let (x, y) = self.point(*first);
		self.content.move_to(x, y);
		for point in rest {
			let (x, y) = self.point(*point);
			self.content.line_to(x, y);
		}
		true
	}

	/// Consumes the backend and writes the complete document.
	pub fn finish(self) -> Vec<u8> {
		let catalog_id = Ref::new(1);
		let page_tree_id = Ref::new(2);
		let page_id = Ref::new(3);
		let content_id = Ref::new(4);
		let font_id = Ref::new(5);
		let state_ids: Vec<Ref> = (6..).take(self.alphas.len()).map(Ref::new).collect();
		let (width, height) = self.page_size();

		let mut pdf = Pdf::new();
		pdf.catalog(catalog_id).pages(page_tree_id);
		pdf.pages(page_tree_id).kids([page_id]).count(1);

		let mut page = pdf.page(page_id);
		page.media_box(Rect::new(0.0, 0.0, width, height));
		page.parent(page_tree_id);
		page.contents(content_id);
		{
			let mut resources = page.resources();
			resources.fonts().pair(FONT_NAME, font_id);
			if !state_ids.is_empty() {
				let mut states = resources.ext_g_states();
				for (index, id) in state_ids.iter().enumerate() {
					let name = graphics_state_name(index);
					states.pair(Name(name.as_bytes()), *id);
				}
			}
		}
		page.finish();

		for (alpha, id) in self.alphas.iter().zip(&state_ids) {
			pdf.ext_graphics(*id)
				.stroking_alpha(*alpha)
				.non_stroking_alpha(*alpha);
		}
		pdf.type1_font(font_id).base_font(Name(b"Helvetica"));
		pdf.stream(content_id, &self.content.finish());
		pdf.finish()
	}
}

fn graphics_state_name(index: usize) -> String {
	format!("GS{index}")
}

impl DrawingBackend for PdfBackend {
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
		let color = Rgba::from(color);
		if color.is_transparent() {
			return Ok(());
		}
		self.set_fill(color);
		let (x, y) = self.point(point);
		self.content
			.rect(x, y - self.scale, self.scale, self.scale)
			.fill_nonzero();
		Ok(())
	}

	fn draw_line<S: BackendStyle>(
		&mut self,
		from: BackendCoord,
		to: BackendCoord,
		style: &S,
	) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
		self.draw_path([from, to], style)
	}

	fn draw_rect<S: BackendStyle>(
		&mut self,
		upper_left: BackendCoord,
		bottom_right: BackendCoord,
		style: &S,
		fill: bool,
	) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
		let stroke = Stroke::capture(style);
		if stroke.color.is_transparent() {
			return Ok(());
		}
		let (x0, y0) = self.point(upper_left);
		let (x1, y1) = self.point(bottom_right);
		if fill {
			self.set_fill(stroke.color);
			self.content.rect(x0, y1, x1 - x0, y0 - y1).fill_nonzero();
		} else {
			self.set_stroke(&stroke);
			self.content.rect(x0, y1, x1 - x0, y0 - y1).stroke();
		}
		Ok(())
	}

	fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
		&mut self,
		path: I,
		style: &S,
	) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
		let stroke = Stroke::capture(style);
		if stroke.color.is_transparent() {
			return Ok(());
		}
		let points: Vec<BackendCoord> = path.into_iter().collect();
		self.set_stroke(&stroke);
		if self.trace_polyline(&points) {
			self.content.stroke();
		}
		Ok(())
	}

	fn draw_circle<S: BackendStyle>(
		&mut self,
		center: BackendCoord,
		radius: u32,
		style: &S,
		fill: bool,
	) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
		let stroke = Stroke::capture(style);
		if stroke.color.is_transparent() {
			return Ok(());
		}
		let (cx, cy) = self.point(center);
		#[allow(clippy::cast_precision_loss)]
		let r = radius as f32 * self.scale;
		let k = r * KAPPA;

		// Paint state has to be set before the path is opened.
		if fill {
			self.set_fill(stroke.color);
		} else {
			self.set_stroke(&stroke);
		}
		self.content
			.move_to(cx + r, cy)
			.cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r)
			.cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy)
			.cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r)
			.cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy)
			.close_path();
		if fill {
			self.content.fill_nonzero();
		} else {
			self.content.stroke();
		}
		Ok(())
	}

	fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
		&mut self,
		vert: I,
		style: &S,
	) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
		let stroke = Stroke::capture(style);
		if stroke.color.is_transparent() {
			return Ok(());
		}
		let points: Vec<BackendCoord> = vert.into_iter().collect();
		self.set_fill(stroke.color);
		if self.trace_polyline(&points) {
			self.content.close_path().fill_nonzero();
		}
		Ok(())
	}

	#[allow(clippy::cast_possible_truncation)]
	fn draw_text<TStyle: BackendTextStyle>(
		&mut self,
		text: &str,
		style: &TStyle,
		pos: BackendCoord,
	) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
		let spec = TextSpec::capture(style);
		if spec.color.is_transparent() || text.is_empty() {
			return Ok(());
		}

		let size = spec.size as f32 * self.scale;
		let width = spec.approximate_width(text) as f32 * self.scale;
		// Offsets from the anchor to the baseline origin, in unrotated text space.
		let dx = match spec.anchor.horizontal {
			Alignment::Start => 0.0,
			Alignment::Center => -width / 2.0,
			Alignment::End => -width,
		};
		let dy = match spec.anchor.vertical {
			Alignment::Start => -0.75 * size,
			Alignment::Center => -0.35 * size,
			Alignment::End => 0.0,
		};

		// Page space turns counter-clockwise while canvas rotation is clockwise.
		let angle = -spec.rotation.degrees().to_radians();
		let (sin, cos) = angle.sin_cos();
		let (x, y) = self.point(pos);
		let origin_x = x + dx * cos - dy * sin;
		let origin_y = y + dx * sin + dy * cos;

		let encoded: Vec<u8> = text
			.chars()
			.map(|c| if c.is_ascii() { c as u8 } else { b'?' })
			.collect();

		self.set_fill(spec.color);
		self.content
			.begin_text()
			.set_font(FONT_NAME, size)
			.set_text_matrix([cos, sin, -sin, cos, origin_x, origin_y])
			.show(Str(&encoded))
			.end_text();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::figure::FigSize;
	use plotters::prelude::*;

	#[test]
	fn page_is_sized_in_points() {
		let backend = PdfBackend::new((640, 480), 100.0);
		let (width, height) = backend.page_size();
		assert!((width - 460.8).abs() < 0.01);
		assert!((height - 345.6).abs() < 0.01);
	}

	#[test]
	fn canvas_origin_maps_to_top_of_page() {
		let backend = PdfBackend::new((72, 72), 72.0);
		assert_eq!(backend.point((0, 0)), (0.0, 72.0));
		assert_eq!(backend.point((72, 72)), (72.0, 0.0));
	}

	#[test]
	fn renders_drawn_shapes_and_text() {
		let figure = Figure::new(FigSize::new(2.0, 1.0), 72.0);
		let root = figure.root();
		root.draw(&Circle::new((20, 20), 10, BLUE.filled())).unwrap();
		root.draw(&Text::new("hello", (5, 50), ("sans-serif", 10).into_font()))
			.unwrap();

		let document = render(&figure).unwrap();
		let text = String::from_utf8_lossy(&document);

		assert!(document.starts_with(b"%PDF-"));
		assert!(text.contains("(hello) Tj"));
		assert!(text.contains("/Type /Page"));
	}

	#[test]
	fn opaque_figures_need_no_graphics_state() {
		let figure = Figure::new(FigSize::new(1.0, 1.0), 72.0);
		figure
			.root()
			.draw(&PathElement::new(vec![(0, 0), (50, 50)], BLACK))
			.unwrap();

		let document = render(&figure).unwrap();
		let text = String::from_utf8_lossy(&document);
		assert!(!text.contains("/ExtGState"));
		assert!(!text.contains(" gs"));
		assert!(!text.contains("/CA "));
	}

	#[test]
	fn translucent_colors_keep_their_alpha() {
		let figure = Figure::new(FigSize::new(2.0, 1.0), 72.0);
		let root = figure.root();
		root.draw(&PathElement::new(vec![(0, 0), (100, 50)], BLACK.mix(0.1)))
			.unwrap();
		root.draw(&Rectangle::new([(10, 10), (40, 40)], RED.mix(0.2).filled()))
			.unwrap();
		root.draw(&PathElement::new(vec![(0, 50), (100, 0)], BLUE))
			.unwrap();

		let document = render(&figure).unwrap();
		let text = String::from_utf8_lossy(&document);

		assert!(text.contains("/ExtGState"));
		assert!(text.contains("/CA "));
		assert!(text.contains("/ca "));
		assert!(text.contains("/GS0 gs"));
		assert!(text.contains("/GS1 gs"));
		// Back to opaque for the last line.
		assert!(text.contains("/GS2 gs"));
	}
}
