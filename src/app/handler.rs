use crate::app::{HandlerError, Kwargs};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

/// A route handler as seen by the plugin chain.
pub type Callback = Arc<dyn RouteHandler>;

/// A callable route handler that declares the names of the arguments it accepts.
///
/// Plugins inspect [`RouteHandler::params`] once, when the router is built, to decide whether a
/// route needs their cooperation.
pub trait RouteHandler: Send + Sync + 'static {
	/// Names of the keyword arguments this handler declares.
	fn params(&self) -> &[String];

	fn call(&self, request: &RequestContext, args: &mut Kwargs) -> Result<Response, HandlerError>;
}

/// Read-only view of the request being handled.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
	pub method: Method,
	pub uri: Uri,
	pub headers: HeaderMap,
	query: HashMap<String, String>,
}

impl RequestContext {
	pub fn new(
		method: Method,
		uri: Uri,
		headers: HeaderMap,
		query: HashMap<String, String>,
	) -> Self {
		Self {
			method,
			uri,
			headers,
			query,
		}
	}

	/// A decoded query string parameter.
	pub fn query(&self, name: &str) -> Option<&str> {
		self.query.get(name).map(String::as_str)
	}
}

/// A [`RouteHandler`] backed by a closure.
pub struct FnHandler<F, R> {
	params: Vec<String>,
	func: F,
	_reply: PhantomData<fn() -> R>,
}

impl<F, R> RouteHandler for FnHandler<F, R>
where
	F: Fn(&RequestContext, &mut Kwargs) -> Result<R, HandlerError> + Send + Sync + 'static,
	R: IntoResponse + 'static,
{
	fn params(&self) -> &[String] {
		&self.params
	}

	fn call(&self, request: &RequestContext, args: &mut Kwargs) -> Result<Response, HandlerError> {
		(self.func)(request, args).map(IntoResponse::into_response)
	}
}

impl<F, R> Debug for FnHandler<F, R> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FnHandler")
			.field("params", &self.params)
			.finish_non_exhaustive()
	}
}

/// Builds a route handler from a closure and the argument names it declares.
///
/// ```
/// use plot_rst::app::{handler, RouteHandler};
///
/// let hello = handler(["name"], |_request, args| {
/// 	Ok(format!("Hello, {}!", args.str("name").unwrap_or("world")))
/// });
/// assert_eq!(hello.params(), ["name"]);
/// ```
pub fn handler<F, R, I, P>(params: I, func: F) -> Callback
where
	F: Fn(&RequestContext, &mut Kwargs) -> Result<R, HandlerError> + Send + Sync + 'static,
	R: IntoResponse + 'static,
	I: IntoIterator<Item = P>,
	P: Into<String>,
{
	Arc::new(FnHandler {
		params: params.into_iter().map(Into::into).collect(),
		func,
		_reply: PhantomData,
	})
}
