use plot_rst::app::{handler, Callback};
use plotters::prelude::*;

/// Line plot of `0..npoints`.
pub fn line() -> Callback {
	handler(["npoints", "fig"], |_, args| {
		let npoints: u32 = args.get("npoints")?;
		let root = args.figure("fig")?.root();
		let top = npoints.max(1);

		let mut chart = ChartBuilder::on(&root)
			.caption(format!("range({npoints})"), ("sans-serif", 20).into_font())
			.margin(10)
			.x_label_area_size(30)
			.y_label_area_size(40)
			.build_cartesian_2d(0..top, 0..top)?;
		chart.configure_mesh().draw()?;
		chart.draw_series(LineSeries::new((0..npoints).map(|x| (x, x)), &BLUE))?;

		root.present()?;
		Ok(())
	})
}

/// Scatter plot of a sampled sine wave, drawn on the `chart` argument.
pub fn scatter() -> Callback {
	handler(["npoints", "chart"], |_, args| {
		let npoints: u32 = args.get("npoints")?;
		let root = args.figure("chart")?.root();
		let points: Vec<(f64, f64)> = (0..npoints)
			.map(f64::from)
			.map(|x| (x, (x * 0.3).sin()))
			.collect();

		let mut chart = ChartBuilder::on(&root)
			.caption("sin(0.3x)", ("sans-serif", 20).into_font())
			.margin(10)
			.x_label_area_size(30)
			.y_label_area_size(40)
			.build_cartesian_2d(0.0..f64::from(npoints.max(1)), -1.1..1.1)?;
		chart.configure_mesh().draw()?;
		chart.draw_series(
			points
				.iter()
				.map(|&(x, y)| Circle::new((x, y), 3, RED.filled())),
		)?;

		root.present()?;
		Ok(())
	})
}
