use plotters_backend::text_anchor::{HPos, Pos, VPos};
use plotters_backend::{
	BackendColor, BackendStyle, BackendTextStyle, FontFamily, FontStyle, FontTransform,
};
use std::convert::Infallible;

/// An owned copy of a plotters [`BackendColor`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba {
	pub rgb: (u8, u8, u8),
	pub alpha: f64,
}

impl Rgba {
	pub const WHITE: Self = Self {
		rgb: (255, 255, 255),
		alpha: 1.0,
	};

	pub fn is_transparent(self) -> bool {
		self.alpha <= 0.0
	}

	/// The color channels scaled to `0.0..=1.0`.
	pub fn to_unit(self) -> (f32, f32, f32) {
		let (r, g, b) = self.rgb;
		(
			f32::from(r) / 255.0,
			f32::from(g) / 255.0,
			f32::from(b) / 255.0,
		)
	}
}

impl From<BackendColor> for Rgba {
	fn from(color: BackendColor) -> Self {
		Self {
			rgb: color.rgb,
			alpha: color.alpha,
		}
	}
}

impl From<Rgba> for BackendColor {
	fn from(color: Rgba) -> Self {
		Self {
			rgb: color.rgb,
			alpha: color.alpha,
		}
	}
}

/// Color and width of a recorded shape outline (or fill).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Stroke {
	pub color: Rgba,
	pub width: u32,
}

impl Stroke {
	pub fn capture<S: BackendStyle>(style: &S) -> Self {
		Self {
			color: style.color().into(),
			width: style.stroke_width(),
		}
	}
}

impl BackendStyle for Stroke {
	fn color(&self) -> BackendColor {
		self.color.into()
	}

	fn stroke_width(&self) -> u32 {
		self.width
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Rotation {
	None,
	Rotate90,
	Rotate180,
	Rotate270,
}

impl Rotation {
	pub const fn degrees(self) -> f32 {
		match self {
			Self::None => 0.0,
			Self::Rotate90 => 90.0,
			Self::Rotate180 => 180.0,
			Self::Rotate270 => 270.0,
		}
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Slant {
	Normal,
	Oblique,
	Italic,
	Bold,
}

/// Horizontal and vertical text anchoring, relative to the text position.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Anchor {
	pub horizontal: Alignment,
	pub vertical: Alignment,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Alignment {
	Start,
	Center,
	End,
}

/// Everything needed to draw a recorded label again on another backend.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
	pub family: String,
	pub size: f64,
	pub color: Rgba,
	pub slant: Slant,
	pub rotation: Rotation,
	pub anchor: Anchor,
}

impl TextSpec {
	pub fn capture<S: BackendTextStyle>(style: &S) -> Self {
		let slant = match style.style() {
			FontStyle::Normal => Slant::Normal,
			FontStyle::Oblique => Slant::Oblique,
			FontStyle::Italic => Slant::Italic,
			FontStyle::Bold => Slant::Bold,
		};
		let rotation = match style.transform() {
			FontTransform::None => Rotation::None,
			FontTransform::Rotate90 => Rotation::Rotate90,
			FontTransform::Rotate180 => Rotation::Rotate180,
			FontTransform::Rotate270 => Rotation::Rotate270,
		};
		let pos = style.anchor();
		let horizontal = match pos.h_pos {
			HPos::Left => Alignment::Start,
			HPos::Center => Alignment::Center,
			HPos::Right => Alignment::End,
		};
		let vertical = match pos.v_pos {
			VPos::Top => Alignment::Start,
			VPos::Center => Alignment::Center,
			VPos::Bottom => Alignment::End,
		};

		Self {
			family: style.family().as_str().to_owned(),
			size: style.size(),
			color: style.color().into(),
			slant,
			rotation,
			anchor: Anchor {
				horizontal,
				vertical,
			},
		}
	}

	/// Rough extent of `text` set in this style, in pixels.
	///
	/// Averages half an em per glyph, which is close enough for the sans-serif
	/// faces used by chart labels.
	#[allow(clippy::cast_precision_loss)]
	pub fn approximate_width(&self, text: &str) -> f64 {
		self.size * 0.5 * text.chars().count() as f64
	}
}

impl BackendTextStyle for TextSpec {
	type FontError = Infallible;

	fn color(&self) -> BackendColor {
		self.color.into()
	}

	fn size(&self) -> f64 {
		self.size
	}

	fn transform(&self) -> FontTransform {
		match self.rotation {
			Rotation::None => FontTransform::None,
			Rotation::Rotate90 => FontTransform::Rotate90,
			Rotation::Rotate180 => FontTransform::Rotate180,
			Rotation::Rotate270 => FontTransform::Rotate270,
		}
	}

	fn style(&self) -> FontStyle {
		match self.slant {
			Slant::Normal => FontStyle::Normal,
			Slant::Oblique => FontStyle::Oblique,
			Slant::Italic => FontStyle::Italic,
			Slant::Bold => FontStyle::Bold,
		}
	}

	fn anchor(&self) -> Pos {
		let h_pos = match self.anchor.horizontal {
			Alignment::Start => HPos::Left,
			Alignment::Center => HPos::Center,
			Alignment::End => HPos::Right,
		};
		let v_pos = match self.anchor.vertical {
			Alignment::Start => VPos::Top,
			Alignment::Center => VPos::Center,
			Alignment::End => VPos::Bottom,
		};
		Pos::new(h_pos, v_pos)
	}

	fn family(&self) -> FontFamily<'_> {
		FontFamily::from(self.family.as_str())
	}

	#[allow(clippy::cast_possible_truncation)]
	fn layout_box(&self, text: &str) -> Result<((i32, i32), (i32, i32)), Self::FontError> {
		let width = self.approximate_width(text).ceil() as i32;
		let height = self.size.ceil() as i32;
		Ok(((0, 0), (width, height)))
	}

	fn draw<E, DrawFunc: FnMut(i32, i32, BackendColor) -> Result<(), E>>(
		&self,
		_text: &str,
		_pos: (i32, i32),
		_draw: DrawFunc,
	) -> Result<Result<(), E>, Self::FontError> {
		// Glyph rasterization is left to the canvas encoders.
		Ok(Ok(()))
	}
}
