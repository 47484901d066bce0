//! Static Chart Renderer
//! Draws the analysis charts with plotters into an in-memory RGB buffer and
//! encodes them as PNG files.
//!
//! Charts:
//! 1. Top regions: horizontal bars of peak confirmed cases, largest on top
//! 2. Global trend: confirmed cases over time, line with markers
//! 3. Correlation heatmap: coolwarm cells annotated with two decimals
//! 4. Continent share: pie of peak confirmed cases, one-decimal percentages

use crate::charts::style::{
    coolwarm, format_count, is_dark, pie_slices, polar_point, viridis_palette, GRID, NAN_CELL,
    PALETTE, TREND_LINE,
};
use crate::stats::{CorrelationMatrix, GroupPeak, TransformError, TrendSeries};
use chrono::{Duration, NaiveDateTime};
use image::RgbImage;
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

const FONT: &str = "sans-serif";

const BAR_SIZE: (u32, u32) = (1200, 600);
const TREND_SIZE: (u32, u32) = (1400, 700);
const HEATMAP_SIZE: (u32, u32) = (800, 640);
const PIE_SIZE: (u32, u32) = (800, 800);

/// matplotlib `startangle=90`: first wedge begins at twelve o'clock.
const PIE_START_DEG: f64 = 90.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart input '{0}' is undefined")]
    UndefinedInput(&'static str),
    #[error("Chart '{0}' has no data to draw")]
    EmptyInput(ChartKind),
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Chart data error: {0}")]
    Data(#[from] TransformError),
    #[error("Failed to allocate image buffer")]
    Buffer,
    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn draw_error<E: fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

/// The four charts, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    TopRegions,
    GlobalTrend,
    CorrelationHeatmap,
    ContinentShare,
}

impl ChartKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::TopRegions => "Top Countries by Total Confirmed COVID-19 Cases",
            Self::GlobalTrend => "Global Trend of Total Confirmed COVID-19 Cases Over Time",
            Self::CorrelationHeatmap => "Correlation Matrix of COVID-19 Metrics",
            Self::ContinentShare => "Total Confirmed Cases by Continent",
        }
    }

    /// Caption drawn on the chart; the bar chart names how many regions it ranks.
    pub fn caption(&self, count: usize) -> String {
        match self {
            Self::TopRegions => {
                format!("Top {} Countries by Total Confirmed COVID-19 Cases", count)
            }
            _ => self.title().to_string(),
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::TopRegions => "top_regions.png",
            Self::GlobalTrend => "global_trend.png",
            Self::CorrelationHeatmap => "correlation_heatmap.png",
            Self::ContinentShare => "continent_share.png",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TopRegions => "top regions",
            Self::GlobalTrend => "global trend",
            Self::CorrelationHeatmap => "correlation heatmap",
            Self::ContinentShare => "continent share",
        };
        f.write_str(name)
    }
}

/// A chart written to disk, kept in memory for the viewer.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub kind: ChartKind,
    pub title: String,
    pub path: PathBuf,
    pub image: RgbImage,
}

/// Renders charts into `output_dir`.
pub struct ChartRenderer {
    output_dir: PathBuf,
}

impl ChartRenderer {
    /// Create the renderer, making sure the output directory exists.
    pub fn new(output_dir: &Path) -> Result<Self, RenderError> {
        std::fs::create_dir_all(output_dir)?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Horizontal bars of peak confirmed cases; input order is kept top to bottom.
    pub fn render_top_regions(&self, peaks: &[GroupPeak]) -> Result<RenderedChart, RenderError> {
        let kind = ChartKind::TopRegions;
        if peaks.is_empty() {
            return Err(RenderError::EmptyInput(kind));
        }

        let n = peaks.len();
        let x_max = peaks
            .iter()
            .map(|p| p.total_confirmed)
            .max()
            .unwrap_or(0)
            .max(1) as f64
            * 1.05;
        let colors = viridis_palette(n);
        let title = kind.caption(n);

        // Row 0 is drawn in the top slot.
        let slot_label = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(slot) if *slot < n => peaks[n - 1 - *slot].name.clone(),
            _ => String::new(),
        };
        let count_label = |v: &f64| format_count(*v);

        let image = Self::draw(BAR_SIZE, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(title.as_str(), (FONT, 26))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(140)
                .build_cartesian_2d(0f64..x_max, (0..n).into_segmented())
                .map_err(draw_error)?;

            chart
                .configure_mesh()
                .disable_y_mesh()
                .light_line_style(GRID.mix(0.4))
                .y_labels(n)
                .y_label_formatter(&slot_label)
                .x_label_formatter(&count_label)
                .x_desc("Total Confirmed Cases (Max)")
                .y_desc("Country")
                .axis_desc_style((FONT, 18))
                .draw()
                .map_err(draw_error)?;

            chart
                .draw_series(peaks.iter().enumerate().map(|(i, peak)| {
                    let slot = n - 1 - i;
                    let mut bar = Rectangle::new(
                        [
                            (0.0, SegmentValue::Exact(slot)),
                            (peak.total_confirmed as f64, SegmentValue::Exact(slot + 1)),
                        ],
                        colors[i].filled(),
                    );
                    bar.set_margin(4, 4, 0, 0);
                    bar
                }))
                .map_err(draw_error)?;

            Ok(())
        })?;

        self.save(kind, title, image)
    }

    /// Confirmed cases against date; `None` means the series was never built.
    pub fn render_global_trend(
        &self,
        trend: Option<&TrendSeries>,
    ) -> Result<RenderedChart, RenderError> {
        let kind = ChartKind::GlobalTrend;
        let trend = trend.ok_or(RenderError::UndefinedInput("global_trend"))?;
        let points = trend.points()?;
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Err(RenderError::EmptyInput(kind));
        };

        let origin = first.0;
        let day_offset = |dt: &NaiveDateTime| (*dt - origin).num_seconds() as f64 / SECONDS_PER_DAY;
        let series: Vec<(f64, f64)> = points
            .iter()
            .map(|(dt, confirmed)| (day_offset(dt), *confirmed as f64))
            .collect();

        let span = day_offset(&last.0).max(1.0);
        let x_range = -span * 0.02..span * 1.02;
        let y_max = series.iter().map(|p| p.1).fold(0.0, f64::max).max(1.0) * 1.1;

        let date_label = |v: &f64| {
            let offset = Duration::seconds((*v * SECONDS_PER_DAY).round() as i64);
            (origin + offset).format("%Y-%m-%d").to_string()
        };
        let count_label = |v: &f64| format_count(*v);

        let image = Self::draw(TREND_SIZE, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(kind.title(), (FONT, 26))
                .margin(25)
                .x_label_area_size(60)
                .y_label_area_size(100)
                .build_cartesian_2d(x_range.clone(), 0f64..y_max)
                .map_err(draw_error)?;

            chart
                .configure_mesh()
                .light_line_style(GRID.mix(0.4))
                .x_labels(8)
                .x_label_formatter(&date_label)
                .y_label_formatter(&count_label)
                .x_desc("Date")
                .y_desc("Total Confirmed Cases")
                .axis_desc_style((FONT, 18))
                .draw()
                .map_err(draw_error)?;

            chart
                .draw_series(LineSeries::new(
                    series.iter().copied(),
                    TREND_LINE.stroke_width(2),
                ))
                .map_err(draw_error)?
                .label("Global Confirmed Cases")
                .legend(|(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], TREND_LINE.stroke_width(2))
                });

            chart
                .draw_series(
                    series
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 3, TREND_LINE.filled())),
                )
                .map_err(draw_error)?;

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font((FONT, 16))
                .draw()
                .map_err(draw_error)?;

            Ok(())
        })?;

        self.save(kind, kind.title().to_string(), image)
    }

    /// Annotated heatmap; matrix row 0 is the top row.
    pub fn render_correlation_heatmap(
        &self,
        matrix: &CorrelationMatrix,
    ) -> Result<RenderedChart, RenderError> {
        let kind = ChartKind::CorrelationHeatmap;
        let n = matrix.size();
        if n == 0 {
            return Err(RenderError::EmptyInput(kind));
        }

        let col_label = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(j) if *j < n => matrix.labels[*j].clone(),
            _ => String::new(),
        };
        let row_label = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(slot) if *slot < n => matrix.labels[n - 1 - *slot].clone(),
            _ => String::new(),
        };

        let image = Self::draw(HEATMAP_SIZE, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(kind.title(), (FONT, 24))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(100)
                .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())
                .map_err(draw_error)?;

            chart
                .configure_mesh()
                .disable_mesh()
                .x_labels(n)
                .y_labels(n)
                .x_label_formatter(&col_label)
                .y_label_formatter(&row_label)
                .label_style((FONT, 15))
                .draw()
                .map_err(draw_error)?;

            let cells: Vec<(usize, usize, f64)> = (0..n)
                .flat_map(|i| (0..n).map(move |j| (i, j)))
                .map(|(i, j)| (i, j, matrix.get(i, j)))
                .collect();

            let corners = |i: usize, j: usize| {
                let slot = n - 1 - i;
                [
                    (SegmentValue::Exact(j), SegmentValue::Exact(slot)),
                    (SegmentValue::Exact(j + 1), SegmentValue::Exact(slot + 1)),
                ]
            };

            chart
                .draw_series(
                    cells
                        .iter()
                        .map(|&(i, j, r)| Rectangle::new(corners(i, j), coolwarm(r).filled())),
                )
                .map_err(draw_error)?;

            chart
                .draw_series(
                    cells
                        .iter()
                        .map(|&(i, j, _)| Rectangle::new(corners(i, j), BLACK.stroke_width(1))),
                )
                .map_err(draw_error)?;

            chart
                .draw_series(cells.iter().map(|&(i, j, r)| {
                    let fill = coolwarm(r);
                    let text_color = if is_dark(&fill) && fill != NAN_CELL {
                        WHITE
                    } else {
                        BLACK
                    };
                    let style = (FONT, 18)
                        .into_font()
                        .color(&text_color)
                        .pos(Pos::new(HPos::Center, VPos::Center));
                    let label = if r.is_nan() {
                        "nan".to_string()
                    } else {
                        format!("{:.2}", r)
                    };
                    Text::new(
                        label,
                        (SegmentValue::CenterOf(j), SegmentValue::CenterOf(n - 1 - i)),
                        style,
                    )
                }))
                .map_err(draw_error)?;

            Ok(())
        })?;

        self.save(kind, kind.title().to_string(), image)
    }

    /// Pie of peak confirmed cases per continent, counter-clockwise from the top.
    pub fn render_continent_share(
        &self,
        peaks: &[GroupPeak],
    ) -> Result<RenderedChart, RenderError> {
        let kind = ChartKind::ContinentShare;
        let values: Vec<f64> = peaks.iter().map(|p| p.total_confirmed as f64).collect();
        let slices = pie_slices(&values, PIE_START_DEG);
        if slices.is_empty() {
            return Err(RenderError::EmptyInput(kind));
        }

        let image = Self::draw(PIE_SIZE, |root| {
            let area = root.titled(kind.title(), (FONT, 26)).map_err(draw_error)?;
            let (w, h) = area.dim_in_pixel();
            let center = (w as i32 / 2, h as i32 / 2);
            let radius = (w.min(h) as f64) * 0.34;

            let centered = |size: u32| {
                TextStyle::from((FONT, size).into_font())
                    .pos(Pos::new(HPos::Center, VPos::Center))
            };

            for (idx, (slice, peak)) in slices.iter().zip(peaks).enumerate() {
                if slice.sweep_deg <= 0.0 {
                    continue;
                }

                let steps = (slice.sweep_deg.ceil() as usize).max(2);
                let mut outline = vec![center];
                outline.extend((0..=steps).map(|s| {
                    let deg = slice.start_deg + slice.sweep_deg * s as f64 / steps as f64;
                    polar_point(center, radius, deg)
                }));

                let color = PALETTE[idx % PALETTE.len()];
                area.draw(&Polygon::new(outline.clone(), color.filled()))
                    .map_err(draw_error)?;
                outline.push(center);
                area.draw(&PathElement::new(outline, BLACK.stroke_width(1)))
                    .map_err(draw_error)?;

                let mid = slice.mid_deg();
                area.draw(&Text::new(
                    slice.label(),
                    polar_point(center, radius * 0.6, mid),
                    centered(18),
                ))
                .map_err(draw_error)?;
                area.draw(&Text::new(
                    peak.name.clone(),
                    polar_point(center, radius * 1.15, mid),
                    centered(18),
                ))
                .map_err(draw_error)?;
            }

            Ok(())
        })?;

        self.save(kind, kind.title().to_string(), image)
    }

    /// Run `paint` on a white canvas and hand back the pixels.
    fn draw<F>(size: (u32, u32), paint: F) -> Result<RgbImage, RenderError>
    where
        F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<(), RenderError>,
    {
        let (w, h) = size;
        let mut buffer = vec![0u8; (w * h * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
            root.fill(&WHITE).map_err(draw_error)?;
            paint(&root)?;
            root.present().map_err(draw_error)?;
        }
        RgbImage::from_raw(w, h, buffer).ok_or(RenderError::Buffer)
    }

    fn save(
        &self,
        kind: ChartKind,
        title: String,
        image: RgbImage,
    ) -> Result<RenderedChart, RenderError> {
        let path = self.output_dir.join(kind.file_name());
        image.save(&path)?;
        info!("Saved {} chart to {}", kind, path.display());
        Ok(RenderedChart {
            kind,
            title,
            path,
            image,
        })
    }
}
