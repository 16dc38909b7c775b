//! The plugin protocol of [`App`] and the figure rendering plugin.

mod figure;

pub use figure::{FigurePlugin, FigureRouteConfig, DEFAULT_KEYWORD, PLUGIN_NAME};

use crate::app::{App, Callback, RouteContext};
use std::any::Any;
use thiserror::Error;

/// Cross-cutting behavior applied to route handlers.
pub trait Plugin: Send + Sync + 'static {
	fn name(&self) -> &str;

	/// Called once by [`App::install`], before the plugin joins the installed plugins.
	fn setup(&self, _app: &App) -> Result<(), PluginError> {
		Ok(())
	}

	/// Wraps a route handler, or returns it unchanged when the plugin does not apply to the route.
	fn apply(&self, callback: Callback, route: &RouteContext<'_>) -> Callback;

	fn as_any(&self) -> &dyn Any;
}

/// Errors that can occur when installing plugins.
#[derive(Debug, Error)]
pub enum PluginError {
	#[error("Found another {plugin} plugin with conflicting settings (non-unique keyword `{keyword}`)")]
	ConflictingKeyword { plugin: String, keyword: String },
}
