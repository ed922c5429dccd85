//! Raster export of a [`ChartData`]: weight as a line on top, calories as
//! bars underneath, one column per day of the range.

use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use tracing::info;

use crate::error::{Error, Result};
use crate::service::chart::ChartData;

pub const EXPORT_WIDTH: u32 = 960;
pub const EXPORT_HEIGHT: u32 = 640;
const MARGIN: i64 = 40;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([128, 128, 128]);
pub const WEIGHT_COLOR: Rgb<u8> = Rgb([31, 119, 180]);
pub const CALORIES_COLOR: Rgb<u8> = Rgb([214, 39, 40]);

#[derive(Debug, Clone, Copy)]
struct Plot {
    left: i64,
    top: i64,
    width: i64,
    height: i64,
}

impl Plot {
    fn bottom(&self) -> i64 {
        self.top + self.height
    }

    /// Pixel row for a value scaled to `[0, 1]`.
    fn y(&self, frac: f64) -> i64 {
        self.bottom() - (frac.clamp(0.0, 1.0) * self.height as f64).round() as i64
    }
}

impl ChartData {
    pub fn render(&self, width: u32, height: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
        let w = i64::from(width);
        let h = i64::from(height);

        let inner_height = (h - 3 * MARGIN).max(2);
        let weight_height = inner_height * 3 / 5;
        let weight_plot = Plot {
            left: MARGIN,
            top: MARGIN,
            width: (w - 2 * MARGIN).max(1),
            height: weight_height,
        };
        let calories_plot = Plot {
            left: MARGIN,
            top: weight_plot.bottom() + MARGIN,
            width: weight_plot.width,
            height: (inner_height - weight_height).max(1),
        };
        draw_axes(&mut img, &weight_plot);
        draw_axes(&mut img, &calories_plot);

        let (_, x_max) = self.x_bounds();
        let slot = weight_plot.width as f64 / (x_max + 1.0);
        let column = |x: f64| weight_plot.left + (slot * (x + 0.5)).round() as i64;

        if let Some((y_min, y_max)) = self.weight_bounds() {
            let points: Vec<(i64, i64)> = self
                .weight_series()
                .into_iter()
                .map(|(x, weight)| (column(x), weight_plot.y((weight - y_min) / (y_max - y_min))))
                .collect();
            for pair in points.windows(2) {
                draw_line(&mut img, pair[0], pair[1], WEIGHT_COLOR);
            }
            for &(x, y) in &points {
                fill_rect(&mut img, x - 2, y - 2, 5, 5, WEIGHT_COLOR);
            }
        }

        let max_calories = f64::from(self.max_calories().max(1));
        let bar_width = ((slot * 0.6) as i64).max(1);
        for point in &self.points {
            let center = column(self.x_of(point.date));
            let top = calories_plot.y(f64::from(point.calories) / max_calories);
            fill_rect(
                &mut img,
                center - bar_width / 2,
                top,
                bar_width,
                calories_plot.bottom() - top,
                CALORIES_COLOR,
            );
        }

        img
    }

    /// Render at the default size and write to `path`, in the format its
    /// extension names.
    pub fn save_image(&self, path: &Path) -> Result<()> {
        let image_error = |source| Error::Image {
            path: path.to_path_buf(),
            source,
        };
        let format = ImageFormat::from_path(path).map_err(image_error)?;
        self.render(EXPORT_WIDTH, EXPORT_HEIGHT)
            .save_with_format(path, format)
            .map_err(image_error)?;
        info!(path = %path.display(), points = self.points.len(), "exported chart");
        Ok(())
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x < img.width() && y < img.height() {
        img.put_pixel(x, y, color);
    }
}

fn fill_rect(img: &mut RgbImage, x: i64, y: i64, width: i64, height: i64, color: Rgb<u8>) {
    for py in y..y + height {
        for px in x..x + width {
            put(img, px, py, color);
        }
    }
}

fn draw_axes(img: &mut RgbImage, plot: &Plot) {
    draw_line(img, (plot.left, plot.top), (plot.left, plot.bottom()), AXIS);
    draw_line(
        img,
        (plot.left, plot.bottom()),
        (plot.left + plot.width, plot.bottom()),
        AXIS,
    );
}

/// Bresenham, two pixels thick.
fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put(img, x, y, color);
        put(img, x, y + 1, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
