//! Plotters-powered ex-ante chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Reference line colors, matched by index to the bands (low, mid, high).
const BAND_COLORS: [RGBColor; 3] = [RGBColor(64, 96, 255), RGBColor(0, 200, 0), RGBColor(255, 0, 0)];

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct ExAntePlottersChart<'a> {
    /// Ex-ante real rate per month, x = month ordinal.
    pub points: &'a [(f64, f64)],
    /// Horizontal reference levels.
    pub bands: &'a [f64],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for ExAntePlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // 1) Neutral-rate reference lines across the whole x range.
            for (band, color) in self.bands.iter().zip(BAND_COLORS.iter().cycle()) {
                chart.draw_series(LineSeries::new([(x0, *band), (x1, *band)], color))?;
            }

            // 2) Ex-ante line.
            let line_color = RGBColor(0, 191, 196);
            chart.draw_series(LineSeries::new(self.points.iter().copied(), &line_color))?;

            // 3) Monthly markers. `Circle` radii are mis-scaled by the ratatui
            // backend, so a colored `Pixel` is used instead.
            let point_color = RGBColor(248, 118, 109);
            chart.draw_series(
                self.points
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), point_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
