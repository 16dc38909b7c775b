use crate::app::{App, Callback, HandlerError, Kwargs, RequestContext, RouteContext, RouteHandler};
use crate::canvas::{print_figure, CanvasFormat, FORMAT_PARAM};
use crate::config::FigureConfig;
use crate::figure::{FigSize, Figure, DEFAULT_DPI};
use crate::plugin::{Plugin, PluginError};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, instrument};

pub const PLUGIN_NAME: &str = "figure";
pub const DEFAULT_KEYWORD: &str = "fig";

/// Per-route overrides of the [`FigurePlugin`] settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FigureRouteConfig {
	pub keyword: Option<String>,
	pub figsize: Option<FigSize>,
}

impl FigureRouteConfig {
	#[must_use]
	pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
		self.keyword = Some(keyword.into());
		self
	}

	#[must_use]
	pub const fn figsize(mut self, figsize: FigSize) -> Self {
		self.figsize = Some(figsize);
		self
	}
}

/// Injects a fresh [`Figure`] into every handler that declares the plugin keyword and answers the
/// request with the figure encoded in the format named by the `canvas_format` query parameter.
///
/// Handlers that do not declare the keyword are left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct FigurePlugin {
	keyword: String,
	figsize: Option<FigSize>,
	dpi: f64,
}

impl FigurePlugin {
	pub fn new(keyword: impl Into<String>) -> Self {
		Self {
			keyword: keyword.into(),
			figsize: None,
			dpi: DEFAULT_DPI,
		}
	}

	pub fn from_config(config: &FigureConfig) -> Self {
		Self {
			keyword: config.keyword.clone(),
			figsize: config.figsize,
			dpi: config.dpi,
		}
	}

	#[must_use]
	pub const fn with_figsize(mut self, figsize: FigSize) -> Self {
		self.figsize = Some(figsize);
		self
	}

	#[must_use]
	pub const fn with_dpi(mut self, dpi: f64) -> Self {
		self.dpi = dpi;
		self
	}

	pub fn keyword(&self) -> &str {
		&self.keyword
	}

	pub const fn figsize(&self) -> Option<FigSize> {
		self.figsize
	}

	pub const fn dpi(&self) -> f64 {
		self.dpi
	}
}

impl Default for FigurePlugin {
	fn default() -> Self {
		Self::new(DEFAULT_KEYWORD)
	}
}

impl Plugin for FigurePlugin {
	fn name(&self) -> &str {
		PLUGIN_NAME
	}

	/// Makes sure that no other installed figure plugin injects the same keyword.
	fn setup(&self, app: &App) -> Result<(), PluginError> {
		let conflict = app
			.plugins()
			.filter_map(|other| other.as_any().downcast_ref::<Self>())
			.any(|other| other.keyword == self.keyword);

		if conflict {
			return Err(PluginError::ConflictingKeyword {
				plugin: PLUGIN_NAME.to_owned(),
				keyword: self.keyword.clone(),
			});
		}
		Ok(())
	}

	fn apply(&self, callback: Callback, route: &RouteContext<'_>) -> Callback {
		// Route-specific values override the plugin settings.
		let overrides = route.config::<FigureRouteConfig>();
		let keyword = overrides
			.and_then(|config| config.keyword.clone())
			.unwrap_or_else(|| self.keyword.clone());
		let figsize = overrides
			.and_then(|config| config.figsize)
			.or(self.figsize)
			.unwrap_or_default();

		if !route.callback.params().contains(&keyword) {
			return callback;
		}

		debug!(
			path = %route.path,
			keyword = %keyword,
			width = figsize.width,
			height = figsize.height,
			"Injecting figure into route"
		);
		Arc::new(FigureHandler {
			inner: callback,
			keyword,
			figsize,
			dpi: self.dpi,
		})
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// A route handler wrapped by [`FigurePlugin`].
struct FigureHandler {
	inner: Callback,
	keyword: String,
	figsize: FigSize,
	dpi: f64,
}

impl RouteHandler for FigureHandler {
	fn params(&self) -> &[String] {
		self.inner.params()
	}

	#[instrument(skip_all, fields(keyword = %self.keyword))]
	fn call(&self, request: &RequestContext, args: &mut Kwargs) -> Result<Response, HandlerError> {
		let figure = Figure::new(self.figsize, self.dpi);
		args.insert_figure(self.keyword.clone(), figure.clone());

		// The handler only draws; whatever it returns is discarded.
		let _ = self.inner.call(request, args)?;

		let format = CanvasFormat::from_query(request.query(FORMAT_PARAM));
		let output = print_figure(&figure, format)?;

		Ok(([(CONTENT_TYPE, format.mime().as_ref())], output).into_response())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::app::handler;
	use axum::body::{to_bytes, Body};
	use axum::http::{Extensions, HeaderMap, Method, Request, StatusCode, Uri};
	use axum::Router;
	use plotters::prelude::*;
	use std::collections::HashMap;
	use std::sync::Mutex;
	use tower::ServiceExt;
	use uuid::Uuid;

	fn plot() -> Callback {
		handler(["npoints", "fig"], |_, args| {
			let npoints: i32 = args.get("npoints")?;
			let root = args.figure("fig")?.root();
			let mut chart = ChartBuilder::on(&root).build_cartesian_2d(0..npoints, 0..npoints)?;
			chart.draw_series(LineSeries::new((0..npoints).map(|x| (x, x)), &RED))?;
			Ok(())
		})
	}

	fn plain() -> Callback {
		handler(["npoints"], |_, args| Ok(args.get::<i32>("npoints")?.to_string()))
	}

	fn apply_to(plugin: &FigurePlugin, callback: &Callback) -> Callback {
		let method = Method::GET;
		let config = Extensions::new();
		let context = RouteContext::new(&method, "/plot/{npoints}", callback, &config);
		plugin.apply(Arc::clone(callback), &context)
	}

	async fn request(router: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
		let response = router
			.oneshot(Request::get(uri).body(Body::empty()).unwrap())
			.await
			.unwrap();
		let status = response.status();
		let content_type = response
			.headers()
			.get(CONTENT_TYPE)
			.map(|v| v.to_str().unwrap().to_owned());
		let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		(status, content_type, body.to_vec())
	}

	fn plot_app(plugin: FigurePlugin) -> Router {
		let mut app = App::new();
		app.install(plugin).unwrap();
		app.get("/plot/{npoints}", plot());
		app.get("/plot/{npoints}/small", plot())
			.config(FigureRouteConfig::default().figsize(FigSize::new(4.0, 3.0)));
		app.get("/count/{npoints}", plain());
		app.into_router().unwrap()
	}

	#[test]
	fn handlers_without_keyword_are_returned_unchanged() {
		let callback = plain();
		let applied = apply_to(&FigurePlugin::default(), &callback);

		assert!(Arc::ptr_eq(&applied, &callback));
	}

	#[test]
	fn handlers_with_keyword_are_wrapped() {
		let callback = plot();
		let applied = apply_to(&FigurePlugin::default(), &callback);

		assert!(!Arc::ptr_eq(&applied, &callback));
		assert_eq!(applied.params(), callback.params());
	}

	#[test]
	fn custom_keyword_must_be_declared() {
		let callback = plot();
		let applied = apply_to(&FigurePlugin::new("chart"), &callback);

		assert!(Arc::ptr_eq(&applied, &callback));
	}

	#[test]
	fn route_config_overrides_keyword() {
		let callback = handler(["chart"], |_, _| Ok(()));
		let method = Method::GET;
		let mut config = Extensions::new();
		config.insert(FigureRouteConfig::default().keyword("chart"));
		let context = RouteContext::new(&method, "/chart", &callback, &config);

		let applied = FigurePlugin::default().apply(Arc::clone(&callback), &context);
		assert!(!Arc::ptr_eq(&applied, &callback));
	}

	#[test]
	fn conflicting_keywords_are_rejected() {
		let mut app = App::new();
		app.install(FigurePlugin::default()).unwrap();

		let result = app.install(FigurePlugin::new("fig").with_dpi(72.0));
		assert!(matches!(
			result,
			Err(PluginError::ConflictingKeyword { keyword, .. }) if keyword == "fig"
		));
		assert_eq!(app.plugins().count(), 1);
	}

	#[test]
	fn distinct_keywords_can_coexist() {
		let mut app = App::new();
		app.install(FigurePlugin::default()).unwrap();
		app.install(FigurePlugin::new("chart")).unwrap();

		assert_eq!(app.plugins().count(), 2);
	}

	#[test]
	fn every_invocation_gets_a_fresh_figure() {
		let seen = Arc::new(Mutex::new(Vec::<Uuid>::new()));
		let recorder = {
			let seen = Arc::clone(&seen);
			handler(["fig"], move |_, args| {
				let figure = args.figure("fig")?;
				assert!(figure.is_empty());
				seen.lock().unwrap().push(figure.id());
				figure
					.root()
					.draw(&Circle::new((10, 10), 4, BLUE.filled()))?;
				Ok(())
			})
		};
		let wrapped = apply_to(&FigurePlugin::default(), &recorder);
		let request = RequestContext::new(
			Method::GET,
			Uri::from_static("/"),
			HeaderMap::new(),
			HashMap::new(),
		);

		for _ in 0..3 {
			wrapped.call(&request, &mut Kwargs::new()).unwrap();
		}

		let seen = seen.lock().unwrap();
		assert_eq!(seen.len(), 3);
		assert_ne!(seen[0], seen[1]);
		assert_ne!(seen[1], seen[2]);
		assert_ne!(seen[0], seen[2]);
	}

	#[test]
	fn handler_errors_propagate_unchanged() {
		let failing = handler(["fig"], |_, _| -> Result<(), HandlerError> {
			Err(HandlerError::Other(anyhow::anyhow!("boom")))
		});
		let wrapped = apply_to(&FigurePlugin::default(), &failing);

		let err = wrapped
			.call(&RequestContext::default(), &mut Kwargs::new())
			.unwrap_err();
		assert!(matches!(err, HandlerError::Other(_)));
		assert_eq!(err.to_string(), "boom");
	}

	#[tokio::test]
	async fn defaults_to_png() {
		let (status, content_type, body) =
			request(plot_app(FigurePlugin::default()), "/plot/10").await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(content_type.as_deref(), Some("image/png"));
		assert_eq!(&body[..8], b"\x89PNG\r\n\x1a\n");
	}

	#[tokio::test]
	async fn unknown_format_falls_back_to_png() {
		let (status, content_type, _) = request(
			plot_app(FigurePlugin::default()),
			"/plot/10?canvas_format=bogus",
		)
		.await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(content_type.as_deref(), Some("image/png"));
	}

	#[tokio::test]
	async fn svg_on_request() {
		let (status, content_type, body) = request(
			plot_app(FigurePlugin::default()),
			"/plot/10?canvas_format=svg",
		)
		.await;
		let body = String::from_utf8(body).unwrap();

		assert_eq!(status, StatusCode::OK);
		assert_eq!(content_type.as_deref(), Some("image/svg+xml"));
		assert!(body.contains("<svg"));
		assert!(body.contains(r#"viewBox="0 0 640 480""#));
		assert!(body.contains("<polyline"));
	}

	#[tokio::test]
	async fn pdf_on_request() {
		let (status, content_type, body) = request(
			plot_app(FigurePlugin::default()),
			"/plot/10?canvas_format=pdf",
		)
		.await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(content_type.as_deref(), Some("application/pdf"));
		assert!(body.starts_with(b"%PDF-"));
	}

	#[tokio::test]
	async fn route_figsize_overrides_plugin_default() {
		let plugin = FigurePlugin::default().with_figsize(FigSize::new(8.0, 6.0));
		let router = plot_app(plugin);

		let (_, _, large) = request(router.clone(), "/plot/10?canvas_format=svg").await;
		let (_, _, small) = request(router, "/plot/10/small?canvas_format=svg").await;

		assert!(String::from_utf8(large)
			.unwrap()
			.contains(r#"viewBox="0 0 800 600""#));
		assert!(String::from_utf8(small)
			.unwrap()
			.contains(r#"viewBox="0 0 400 300""#));
	}

	#[tokio::test]
	async fn dpi_scales_raster_output() {
		let plugin = FigurePlugin::default()
			.with_figsize(FigSize::new(2.0, 1.0))
			.with_dpi(50.0);
		let (_, _, body) = request(plot_app(plugin), "/plot/5").await;

		assert_eq!(u32::from_be_bytes(body[16..20].try_into().unwrap()), 100);
		assert_eq!(u32::from_be_bytes(body[20..24].try_into().unwrap()), 50);
	}

	#[tokio::test]
	async fn render_failures_are_server_errors() {
		let plugin = FigurePlugin::default().with_figsize(FigSize::new(1000.0, 1000.0));
		let (status, _, body) = request(plot_app(plugin), "/plot/3").await;

		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert!(String::from_utf8(body).unwrap().contains("exceeds the limit"));
	}

	#[tokio::test]
	async fn routes_without_keyword_keep_their_response() {
		let (status, content_type, body) =
			request(plot_app(FigurePlugin::default()), "/count/7?canvas_format=svg").await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
		assert_eq!(body, b"7");
	}

	#[tokio::test]
	async fn invalid_path_argument_is_a_client_error() {
		let (status, _, _) = request(plot_app(FigurePlugin::default()), "/plot/abc").await;

		assert_eq!(status, StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn skipped_routes_are_not_rendered() {
		let mut app = App::new();
		app.install(FigurePlugin::default()).unwrap();
		app.get(
			"/raw",
			handler(["fig"], |_, args| {
				Ok(if args.contains("fig") { "injected" } else { "raw" })
			}),
		)
		.skip(PLUGIN_NAME);

		let (status, _, body) = request(app.into_router().unwrap(), "/raw").await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, b"raw");
	}
}
