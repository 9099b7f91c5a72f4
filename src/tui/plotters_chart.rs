//! Plotters-powered spend vs revenue chart widget for Ratatui.
//!
//! Each ad is a dot at (spend, revenue). The diagonal is the break-even line
//! (ROAS = 1): dots above it returned more than they cost.
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

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct SpendRevenueChart<'a> {
    /// Ads currently ON.
    pub on: &'a [(f64, f64)],
    /// Ads currently OFF.
    pub off: &'a [(f64, f64)],
    /// X bounds (spend).
    pub x_bounds: [f64; 2],
    /// Y bounds (revenue).
    pub y_bounds: [f64; 2],
    pub fmt_axis: fn(f64) -> String,
}

impl<'a> Widget for SpendRevenueChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("spend")
                .y_desc("revenue")
                .x_labels(4)
                .y_labels(4)
                .x_label_formatter(&|v| (self.fmt_axis)(*v))
                .y_label_formatter(&|v| (self.fmt_axis)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let break_even = RGBColor(255, 255, 0);
            let on_color = RGBColor(0, 255, 0);
            let off_color = RGBColor(128, 128, 128);

            let hi = x1.min(y1);
            let lo = x0.max(y0);
            if hi > lo {
                chart.draw_series(LineSeries::new([(lo, lo), (hi, hi)], &break_even))?;
            }

            // `Circle` radii are mis-scaled by the terminal backend; pixels render cleanly.
            chart.draw_series(self.off.iter().map(|&(x, y)| Pixel::new((x, y), off_color)))?;
            chart.draw_series(self.on.iter().map(|&(x, y)| Pixel::new((x, y), on_color)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
