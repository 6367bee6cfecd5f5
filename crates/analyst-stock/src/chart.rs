//! Chart collaborator: renders a close-price line chart to a PNG file

use chrono::NaiveDate;
use plotters::prelude::*;
use plotters::style::FontStyle;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

use crate::config::StockConfig;

/// Font family every text element is drawn with
const FONT_FAMILY: &str = "sans-serif";

/// Locations tried when no font is configured
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// plotters keeps registered fonts process-wide, so registration happens once
static REGISTERED_FONT: OnceLock<Result<PathBuf, String>> = OnceLock::new();

/// Chart rendering errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    /// Nothing to plot
    #[error("cannot render an empty series")]
    EmptySeries,

    /// Output location cannot be prepared
    #[error("cannot prepare output {path}: {reason}")]
    Output { path: String, reason: String },

    /// Backend failed while drawing or encoding
    #[error("drawing failed: {0}")]
    Draw(String),

    /// No usable font could be loaded
    #[error("font unavailable: {0}")]
    Font(String),
}

/// A dated line chart with highlighted points
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(NaiveDate, f64)>,
    pub highlights: Vec<(NaiveDate, f64)>,
    pub path: PathBuf,
}

/// Renders charts and persists them
#[cfg_attr(test, mockall::automock)]
pub trait ChartRenderer: Send + Sync {
    fn render(&self, chart: &LineChart) -> Result<(), ChartError>;
}

/// PNG renderer backed by `plotters`
#[derive(Debug, Clone)]
pub struct PlottersChartRenderer {
    width: u32,
    height: u32,
    with_text: bool,
}

impl PlottersChartRenderer {
    /// Create a renderer, registering a font for chart text if one can be found
    ///
    /// The font is registered once per process. A later renderer asking for
    /// a different `font_path` keeps using the first font, and a warning is
    /// logged.
    pub fn new(width: u32, height: u32, font_path: Option<&Path>) -> Self {
        let with_text = match register_font(font_path) {
            Ok(path) => {
                tracing::debug!(font = %path.display(), "Chart font registered");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Charts will be rendered without text");
                false
            }
        };

        Self {
            width,
            height,
            with_text,
        }
    }

    pub fn from_config(config: &StockConfig) -> Self {
        Self::new(
            config.chart_width,
            config.chart_height,
            config.font_path.as_deref(),
        )
    }

    /// Whether title and axis labels are drawn
    pub fn draws_text(&self) -> bool {
        self.with_text
    }
}

impl ChartRenderer for PlottersChartRenderer {
    fn render(&self, chart: &LineChart) -> Result<(), ChartError> {
        let Some(origin) = chart.points.iter().map(|(date, _)| *date).min() else {
            return Err(ChartError::EmptySeries);
        };
        prepare_parent(&chart.path)?;

        let to_xy = |(date, close): &(NaiveDate, f64)| ((*date - origin).num_days() as f64, *close);
        let points: Vec<(f64, f64)> = chart.points.iter().map(to_xy).collect();
        let highlights: Vec<(f64, f64)> = chart.highlights.iter().map(to_xy).collect();
        let (x_range, y_range) = axis_ranges(&points);

        let root = BitMapBackend::new(&chart.path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let mut builder = ChartBuilder::on(&root);
        builder.margin(20);
        if self.with_text {
            builder
                .caption(&chart.title, (FONT_FAMILY, 24).into_font())
                .x_label_area_size(40)
                .y_label_area_size(70);
        }
        let mut plot = builder
            .build_cartesian_2d(x_range, y_range)
            .map_err(draw_error)?;

        if self.with_text {
            plot.configure_mesh()
                .x_desc(chart.x_label.as_str())
                .y_desc(chart.y_label.as_str())
                .x_label_formatter(&|x| format_day(origin, *x))
                .label_style((FONT_FAMILY, 14).into_font())
                .draw()
                .map_err(draw_error)?;
        }

        plot.draw_series(LineSeries::new(points, BLUE.stroke_width(2)))
            .map_err(draw_error)?;
        plot.draw_series(
            highlights
                .into_iter()
                .map(|point| Circle::new(point, 5, RED.filled())),
        )
        .map_err(draw_error)?;

        root.present().map_err(draw_error)?;
        tracing::debug!(path = %chart.path.display(), "Chart written");
        Ok(())
    }
}

fn register_font(preferred: Option<&Path>) -> Result<&'static Path, ChartError> {
    let first_call = REGISTERED_FONT.get().is_none();
    let registered = REGISTERED_FONT.get_or_init(|| load_font(preferred));
    if let Some(ignored) = ignored_font(registered, preferred).filter(|_| !first_call) {
        tracing::warn!(
            requested = %ignored.display(),
            "Chart font was chosen by an earlier renderer; requested font ignored"
        );
    }

    registered
        .as_deref()
        .map_err(|e| ChartError::Font(e.clone()))
}

/// Requested font that differs from the one registered for the process
fn ignored_font<'a>(
    registered: &Result<PathBuf, String>,
    preferred: Option<&'a Path>,
) -> Option<&'a Path> {
    let preferred = preferred?;
    match registered {
        Ok(path) if path.as_path() == preferred => None,
        _ => Some(preferred),
    }
}

fn load_font(preferred: Option<&Path>) -> Result<PathBuf, String> {
    let candidates = preferred
        .map(Path::to_path_buf)
        .into_iter()
        .chain(FONT_CANDIDATES.iter().map(PathBuf::from));

    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        // Registered fonts must outlive every chart drawn by the process.
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        if plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok() {
            return Ok(path);
        }
        tracing::debug!(font = %path.display(), "Skipping unreadable font");
    }

    Err("no usable TrueType font found; set ANALYST_FONT_PATH".to_string())
}

fn prepare_parent(path: &Path) -> Result<(), ChartError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|e| ChartError::Output {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Pad both axes so a flat or single-point series still has a visible range
fn axis_ranges(points: &[(f64, f64)]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let (mut x_max, mut y_min, mut y_max) = (0.0_f64, f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        x_max = x_max.max(x);
        if y.is_finite() {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if !y_min.is_finite() {
        (y_min, y_max) = (0.0, 1.0);
    }

    let x_pad = if x_max > 0.0 { x_max * 0.02 } else { 0.5 };
    let spread = y_max - y_min;
    let y_pad = if spread > 0.0 {
        spread * 0.05
    } else {
        (y_max.abs() * 0.01).max(1.0)
    };

    (-x_pad..x_max + x_pad, y_min - y_pad..y_max + y_pad)
}

fn format_day(origin: NaiveDate, offset: f64) -> String {
    origin
        .checked_add_signed(chrono::Duration::days(offset.round() as i64))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn draw_error(err: impl std::fmt::Display) -> ChartError {
    ChartError::Draw(err.to_string())
}
