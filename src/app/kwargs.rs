use crate::app::HandlerError;
use crate::figure::Figure;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone)]
enum Value {
	Text(String),
	Figure(Figure),
}

/// Named arguments of one handler invocation.
///
/// Starts out with the path parameters of the matched route; plugins add the values they inject.
#[derive(Debug, Clone, Default)]
pub struct Kwargs {
	values: HashMap<String, Value>,
}

impl Kwargs {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert_str(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.values.insert(name.into(), Value::Text(value.into()));
	}

	pub fn insert_figure(&mut self, name: impl Into<String>, figure: Figure) {
		self.values.insert(name.into(), Value::Figure(figure));
	}

	pub fn contains(&self, name: &str) -> bool {
		self.values.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// The raw text of a path parameter.
	pub fn str(&self, name: &str) -> Option<&str> {
		match self.values.get(name) {
			Some(Value::Text(value)) => Some(value),
			_ => None,
		}
	}

	/// Parses a path parameter.
	pub fn get<T: FromStr>(&self, name: &str) -> Result<T, HandlerError> {
		let value = self
			.str(name)
			.ok_or_else(|| HandlerError::MissingArgument(name.to_owned()))?;
		value.parse().map_err(|_| HandlerError::InvalidArgument {
			name: name.to_owned(),
			value: value.to_owned(),
		})
	}

	/// The figure injected under `name`.
	pub fn figure(&self, name: &str) -> Result<&Figure, HandlerError> {
		match self.values.get(name) {
			Some(Value::Figure(figure)) => Ok(figure),
			_ => Err(HandlerError::MissingArgument(name.to_owned())),
		}
	}
}

impl<K, V> FromIterator<(K, V)> for Kwargs
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut kwargs = Self::new();
		for (name, value) in iter {
			kwargs.insert_str(name, value);
		}
		kwargs
	}
}
