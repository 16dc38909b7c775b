use axum::extract::State;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use plot_rst::App;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
	pub method: String,
	pub path: String,
}

pub fn routes(app: &App) -> Router {
	let listing: Vec<RouteInfo> = app
		.routes()
		.map(|route| RouteInfo {
			method: route.method().to_string(),
			path: route.path().to_owned(),
		})
		.collect();

	Router::new()
		.route("/", get(index))
		.route("/routes", get(list_routes))
		.with_state(Arc::new(listing))
}

async fn index() -> impl IntoResponse {
	format!(
		"This server is running plot-rst (v{})",
		env!("CARGO_PKG_VERSION")
	)
}

/// Lists the plotting routes registered with the application.
async fn list_routes(State(listing): State<Arc<Vec<RouteInfo>>>) -> impl IntoResponse {
	Json(listing.as_ref().clone())
}
