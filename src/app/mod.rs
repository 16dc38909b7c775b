//! A small plugin host on top of [`axum::Router`].
//!
//! Routes are registered as [`RouteHandler`]s that declare their argument names. Installed
//! [`Plugin`]s get to wrap every route handler once, when [`App::into_router`] assembles the axum
//! router.

mod error;
mod handler;
mod kwargs;

pub use error::{AppError, HandlerError};
pub use handler::{handler, Callback, FnHandler, RequestContext, RouteHandler};
pub use kwargs::Kwargs;

use crate::plugin::{Plugin, PluginError};
use axum::extract::{Path, Query};
use axum::http::{Extensions, HeaderMap, Method, Uri};
use axum::response::IntoResponse;
use axum::routing::{on, MethodFilter};
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// A registered route before the plugin chain has been applied.
pub struct Route {
	method: Method,
	path: String,
	callback: Callback,
	config: Extensions,
	skip: Vec<String>,
}

impl Route {
	pub const fn method(&self) -> &Method {
		&self.method
	}

	pub fn path(&self) -> &str {
		&self.path
	}
}

/// Route metadata handed to [`Plugin::apply`].
pub struct RouteContext<'a> {
	pub method: &'a Method,
	pub path: &'a str,
	/// The handler as registered, before any plugin wrapped it.
	pub callback: &'a Callback,
	config: &'a Extensions,
}

impl<'a> RouteContext<'a> {
	pub const fn new(
		method: &'a Method,
		path: &'a str,
		callback: &'a Callback,
		config: &'a Extensions,
	) -> Self {
		Self {
			method,
			path,
			callback,
			config,
		}
	}

	/// Per-route configuration of type `T`, if the route was registered with one.
	pub fn config<T: Send + Sync + 'static>(&self) -> Option<&T> {
		self.config.get::<T>()
	}
}

/// Configures a route right after registration.
pub struct RouteBuilder<'a> {
	route: &'a mut Route,
}

impl RouteBuilder<'_> {
	/// Attaches typed configuration that plugins may read when wrapping this route.
	pub fn config<T: Clone + Send + Sync + 'static>(self, value: T) -> Self {
		self.route.config.insert(value);
		self
	}

	/// Excludes the plugin named `name` from this route.
	pub fn skip(self, name: impl Into<String>) -> Self {
		self.route.skip.push(name.into());
		self
	}
}

/// An application: installed plugins plus registered routes.
#[derive(Default)]
pub struct App {
	plugins: Vec<Arc<dyn Plugin>>,
	routes: Vec<Route>,
}

impl App {
	pub fn new() -> Self {
		Self::default()
	}

	/// Installs a plugin after letting it validate itself against the plugins already installed.
	pub fn install<P: Plugin>(&mut self, plugin: P) -> Result<&mut Self, PluginError> {
		plugin.setup(self)?;
		info!(plugin = plugin.name(), "Installed plugin");
		self.plugins.push(Arc::new(plugin));
		Ok(self)
	}

	/// The installed plugins, in installation order.
	pub fn plugins(&self) -> impl Iterator<Item = &dyn Plugin> {
		self.plugins.iter().map(Arc::as_ref)
	}

	pub fn routes(&self) -> impl Iterator<Item = &Route> {
		self.routes.iter()
	}

	/// Registers a route. A later registration for the same method and path replaces the earlier
	/// one.
	pub fn route(
		&mut self,
		method: Method,
		path: impl Into<String>,
		callback: Callback,
	) -> RouteBuilder<'_> {
		let route = Route {
			method,
			path: path.into(),
			callback,
			config: Extensions::new(),
			skip: Vec::new(),
		};
		let existing = self
			.routes
			.iter()
			.position(|other| other.method == route.method && other.path == route.path);

		let index = if let Some(index) = existing {
			debug!(method = %route.method, path = %route.path, "Replacing route");
			self.routes[index] = route;
			index
		} else {
			self.routes.push(route);
			self.routes.len() - 1
		};
		RouteBuilder {
			route: &mut self.routes[index],
		}
	}

	pub fn get(&mut self, path: impl Into<String>, callback: Callback) -> RouteBuilder<'_> {
		self.route(Method::GET, path, callback)
	}

	pub fn post(&mut self, path: impl Into<String>, callback: Callback) -> RouteBuilder<'_> {
		self.route(Method::POST, path, callback)
	}

	/// Wraps a route handler with every applicable plugin.
	///
	/// The first installed plugin ends up as the outermost wrapper.
	fn apply_plugins(&self, route: &Route) -> Callback {
		let context = RouteContext::new(&route.method, &route.path, &route.callback, &route.config);

		self.plugins
			.iter()
			.rev()
			.filter(|plugin| !route.skip.iter().any(|name| name == plugin.name()))
			.fold(Arc::clone(&route.callback), |callback, plugin| {
				plugin.apply(callback, &context)
			})
	}

	/// Applies the plugin chain to every route and builds the axum router.
	pub fn into_router<S>(self) -> Result<Router<S>, AppError>
	where
		S: Clone + Send + Sync + 'static,
	{
		let mut router = Router::new();

		for route in &self.routes {
			let filter = MethodFilter::try_from(route.method.clone()).map_err(|_| {
				AppError::UnsupportedMethod {
					method: route.method.clone(),
					path: route.path.clone(),
				}
			})?;
			let callback = self.apply_plugins(route);
			debug!(method = %route.method, path = %route.path, "Registered route");

			router = router.route(
				&route.path,
				on(
					filter,
					move |Path(params): Path<HashMap<String, String>>,
					      Query(query): Query<HashMap<String, String>>,
					      method: Method,
					      uri: Uri,
					      headers: HeaderMap| async move {
						let request = RequestContext::new(method, uri, headers, query);
						let mut args: Kwargs = params.into_iter().collect();
						match callback.call(&request, &mut args) {
							Ok(response) => response,
							Err(err) => err.into_response(),
						}
					},
				),
			);
		}

		Ok(router)
	}
}
