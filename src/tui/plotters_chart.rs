//! Plotters-powered trend chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer line rendering for several overlapping series
//! - easy to extend later (legend, annotations, exportable PNG/SVG backends, etc.)
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// One party's geometry: the smoothed trend line plus raw-poll markers.
pub struct PartySeries {
    pub color: (u8, u8, u8),
    /// Trend line, `(days, share)` ascending by day.
    pub line: Vec<(f64, f64)>,
    /// Raw polls, `(days, share)`.
    pub markers: Vec<(f64, f64)>,
}

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: all series and bounds are
/// computed outside the render call. This keeps `render()` focused on
/// drawing and makes it easy to test the data prep separately.
pub struct TrendPlottersChart<'a> {
    pub series: &'a [PartySeries],
    /// X bounds (days since epoch).
    pub x_bounds: [f64; 2],
    /// Y bounds (vote share, percent).
    pub y_bounds: [f64; 2],
    /// Horizontal majority reference, drawn only when the ceiling reaches it.
    pub majority: Option<f64>,
    /// Crosshair x position (days) for the hovered point.
    pub crosshair: Option<f64>,
}

impl Widget for TrendPlottersChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a
        // chart. In that case, we render a small hint rather than panicking.
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

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        // `plotters-ratatui-backend` draws Plotters primitives via Ratatui's
        // `Canvas` widget, which ultimately writes to the terminal buffer.
        //
        // We delegate rendering to the crate-provided widget helper to avoid
        // coupling our code to its internal backend types.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                // Tick labels live outside this widget; keep every cell for
                // the plot itself.
                .margin(0)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Guides first so data draws over them.
            let guide_color = RGBColor(110, 110, 110);
            if let Some(majority) = self.majority {
                chart.draw_series(LineSeries::new(
                    [(x0, majority), (x1, majority)],
                    &guide_color,
                ))?;
            }
            if let Some(x) = self.crosshair {
                chart.draw_series(LineSeries::new([(x, y0), (x, y1)], &guide_color))?;
            }

            for series in self.series {
                let (r, g, b) = series.color;
                let color = RGBColor(r, g, b);

                // 1) Raw-poll markers.
                //
                // We intentionally avoid `Circle` markers here. The underlying
                // `plotters-ratatui-backend` currently maps circle radii
                // incorrectly (pixel radius -> normalized canvas units),
                // producing huge circles. A colored `Pixel` gives a clean
                // "dot" that looks good in terminals.
                chart.draw_series(
                    series
                        .markers
                        .iter()
                        .map(|&(x, y)| Pixel::new((x, y), color.mix(0.6))),
                )?;

                // 2) Smoothed trend line on top.
                chart.draw_series(LineSeries::new(series.line.iter().copied(), &color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
