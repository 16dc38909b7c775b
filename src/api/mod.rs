use axum::Router;
use plot_rst::config::FigureConfig;
use plot_rst::{App, FigSize, FigurePlugin, FigureRouteConfig};

mod home;
mod plots;

/// Keyword of the second figure plugin, used by the scatter route.
pub const CHART_KEYWORD: &str = "chart";

/// Builds the demo application: a figure plugin configured from `config`, a second one
/// injecting `chart`, and the plotting routes.
pub fn app(config: &FigureConfig) -> anyhow::Result<App> {
	let mut app = App::new();
	app.install(FigurePlugin::from_config(config))?
		.install(FigurePlugin::new(CHART_KEYWORD).with_dpi(config.dpi))?;

	app.get("/plot/{npoints}", plots::line());
	app.get("/plot/{npoints}/small", plots::line())
		.config(FigureRouteConfig::default().figsize(FigSize::new(4.0, 3.0)));
	app.get("/scatter/{npoints}", plots::scatter());

	Ok(app)
}

pub fn routes(app: App) -> anyhow::Result<Router> {
	let home = home::routes(&app);
	Ok(app.into_router()?.merge(home))
}
