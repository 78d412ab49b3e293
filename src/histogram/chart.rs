//! Renders a [`Histogram`] as a filled line chart and encodes it as PNG.

use std::io::Cursor;
use std::sync::OnceLock;

use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use crate::error::{Error, Result};
use crate::histogram::histogram::{Histogram, BINS};

pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 400;

const FONT_FAMILY: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static FONT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

const LINE_COLOR: RGBColor = RGBColor(0, 0, 255);
const FILL_COLOR: RGBColor = RGBColor(173, 216, 230);
const GRID_COLOR: RGBColor = RGBColor(225, 225, 225);

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::render(e.to_string())
}

/// Registers the bundled font with plotters once per process.
fn ensure_font() -> Result<()> {
    FONT.get_or_init(|| {
        register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES)
            .map_err(|_| "bundled font is not a valid TrueType font".to_owned())
    })
    .clone()
    .map_err(Error::render)
}

/// Draws the histogram into an RGB buffer of `CHART_WIDTH × CHART_HEIGHT`.
///
/// x = intensity 0..=255, y = frequency; the line is drawn over a filled
/// area, with title, axis labels and grid lines.
pub fn render_rgb(hist: &Histogram) -> Result<RgbImage> {
    ensure_font()?;

    let mut buf = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let max = hist.max_count().max(1);
        let y_top = max + max / 20 + 1;

        let mut chart = ChartBuilder::on(&root)
            .caption("Image Histogram", (FONT_FAMILY, 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(64)
            .build_cartesian_2d(0u32..(BINS as u32 - 1), 0u64..y_top)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_desc("Pixel Intensity")
            .y_desc("Frequency")
            .axis_desc_style((FONT_FAMILY, 16))
            .label_style((FONT_FAMILY, 12))
            .light_line_style(GRID_COLOR)
            .draw()
            .map_err(render_err)?;

        let points = hist.counts().iter().enumerate().map(|(i, &c)| (i as u32, c));
        chart
            .draw_series(
                AreaSeries::new(points, 0u64, FILL_COLOR.mix(0.5))
                    .border_style(LINE_COLOR.stroke_width(2)),
            )
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }

    RgbImage::from_raw(CHART_WIDTH, CHART_HEIGHT, buf)
        .ok_or_else(|| Error::render("chart buffer has the wrong size"))
}

/// Renders the histogram and encodes it as PNG bytes.
pub fn render_png(hist: &Histogram) -> Result<Vec<u8>> {
    let img = DynamicImage::ImageRgb8(render_rgb(hist)?);
    let mut png: Vec<u8> = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(render_err)?;
    Ok(png)
}

/// Renders the histogram as base64 PNG, ready for a `data:image/png;base64,` URI.
pub fn render_base64(hist: &Histogram) -> Result<String> {
    Ok(general_purpose::STANDARD.encode(render_png(hist)?))
}
