//! Plotting endpoints for axum without the boilerplate.
//!
//! Install a [`FigurePlugin`] into an [`App`] and every route handler that declares the plugin's
//! keyword (`fig` by default) receives a fresh [`Figure`] to draw on with [`plotters`]. The plugin
//! answers the request with the figure encoded as PNG, SVG or PDF, as selected by the
//! `canvas_format` query parameter. Routes that don't declare the keyword are left untouched.
//!
//! ```no_run
//! use plot_rst::app::{handler, App};
//! use plot_rst::FigurePlugin;
//! use plotters::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut app = App::new();
//! app.install(FigurePlugin::default())?;
//! app.get(
//! 	"/plot/{npoints}",
//! 	handler(["npoints", "fig"], |_, args| {
//! 		let npoints: i32 = args.get("npoints")?;
//! 		let root = args.figure("fig")?.root();
//! 		let mut chart = ChartBuilder::on(&root).build_cartesian_2d(0..npoints, 0..npoints)?;
//! 		chart.draw_series(LineSeries::new((0..npoints).map(|x| (x, x)), &BLUE))?;
//! 		Ok(())
//! 	}),
//! );
//! let _router: axum::Router = app.into_router()?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod canvas;
pub mod config;
pub mod figure;
pub mod plugin;

pub use app::App;
pub use canvas::{print_figure, CanvasFormat};
pub use figure::{FigSize, Figure};
pub use plugin::{FigurePlugin, FigureRouteConfig, Plugin, PluginError};
