//! North-up DEM rasters and elevation sampling.
//!
//! Sampling never substitutes a value: a point outside the grid extent, on a
//! no-data cell or on a NaN cell yields `None`.

use crate::Point;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RasterError {
    #[error("invalid raster buffer length (expected {expected} cells, got {got})")]
    InvalidBuffer { expected: usize, got: usize },
    #[error("invalid pixel size ({width} x {height})")]
    InvalidPixelSize { width: f64, height: f64 },
}

/// Placement of a north-up grid in map coordinates.
///
/// `origin` is the outer top-left corner of cell `(0, 0)`; columns grow
/// eastwards by `pixel_width`, rows grow southwards by `pixel_height`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Fractional (column, row) of a map coordinate.
    #[inline]
    pub fn to_pixel(&self, p: &Point) -> (f64, f64) {
        (
            (p.x - self.origin_x) / self.pixel_width,
            (self.origin_y - p.y) / self.pixel_height,
        )
    }
}

/// How a raster turns a map coordinate into an elevation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Value of the cell containing the point.
    #[default]
    Nearest,
    /// Blend of the four surrounding cell centres.
    Bilinear,
}

/// Source of elevations for prominence and accuracy runs.
///
/// Implementations must be read-only; the same sampler may be queried for
/// many summits in any order.
pub trait ElevationSampler {
    /// Elevation at `p`, or `None` when `p` is outside coverage or no-data.
    fn sample(&self, p: &Point) -> Option<f64>;

    /// Elevation at `p` using `mode`. Samplers that are not grids have
    /// nothing to interpolate and fall back to [`sample`](Self::sample).
    fn sample_with(&self, p: &Point, _mode: Interpolation) -> Option<f64> {
        self.sample(p)
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct DemGridView<'a> {
    pub width: usize,
    pub height: usize,
    pub transform: GeoTransform,
    pub nodata: Option<f64>,
    pub data: &'a [f64], // row-major, len = w*h
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemGrid {
    pub width: usize,
    pub height: usize,
    pub transform: GeoTransform,
    #[serde(default)]
    pub nodata: Option<f64>,
    pub data: Vec<f64>,
}

impl DemGrid {
    pub fn new(
        width: usize,
        height: usize,
        transform: GeoTransform,
        nodata: Option<f64>,
        data: Vec<f64>,
    ) -> Result<Self, RasterError> {
        let grid = Self {
            width,
            height,
            transform,
            nodata,
            data,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Check buffer length and pixel size; deserialized grids bypass `new`.
    pub fn validate(&self) -> Result<(), RasterError> {
        let expected = self.width * self.height;
        if self.data.len() != expected {
            return Err(RasterError::InvalidBuffer {
                expected,
                got: self.data.len(),
            });
        }
        let GeoTransform {
            pixel_width,
            pixel_height,
            ..
        } = self.transform;
        if !(pixel_width > 0.0 && pixel_height > 0.0) {
            return Err(RasterError::InvalidPixelSize {
                width: pixel_width,
                height: pixel_height,
            });
        }
        Ok(())
    }

    pub(crate) fn view(&self) -> DemGridView<'_> {
        DemGridView {
            width: self.width,
            height: self.height,
            transform: self.transform,
            nodata: self.nodata,
            data: &self.data,
        }
    }
}

#[inline]
fn get_cell(src: &DemGridView<'_>, col: i64, row: i64) -> Option<f64> {
    if col < 0 || row < 0 || col >= src.width as i64 || row >= src.height as i64 {
        return None;
    }
    let v = *src.data.get(row as usize * src.width + col as usize)?;
    if v.is_nan() || src.nodata == Some(v) {
        return None;
    }
    Some(v)
}

impl DemGridView<'_> {
    /// Value of the cell containing `p`.
    pub fn sample_cell(&self, p: &Point) -> Option<f64> {
        let (fx, fy) = self.transform.to_pixel(p);
        if !fx.is_finite() || !fy.is_finite() {
            return None;
        }
        get_cell(self, fx.floor() as i64, fy.floor() as i64)
    }

    /// Bilinear interpolation between the four surrounding cell centres.
    ///
    /// Returns `None` if any of the four cells is missing, so results near
    /// no-data holes or the grid border are never blended with fill values.
    pub fn sample_bilinear(&self, p: &Point) -> Option<f64> {
        let (fx, fy) = self.transform.to_pixel(p);
        let x = fx - 0.5;
        let y = fy - 0.5;
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let tx = x - x0 as f64;
        let ty = y - y0 as f64;

        let p00 = get_cell(self, x0, y0)?;
        let p10 = get_cell(self, x0 + 1, y0)?;
        let p01 = get_cell(self, x0, y0 + 1)?;
        let p11 = get_cell(self, x0 + 1, y0 + 1)?;

        let a = p00 + tx * (p10 - p00);
        let b = p01 + tx * (p11 - p01);
        Some(a + ty * (b - a))
    }
}

impl ElevationSampler for DemGrid {
    fn sample(&self, p: &Point) -> Option<f64> {
        self.view().sample_cell(p)
    }

    fn sample_with(&self, p: &Point, mode: Interpolation) -> Option<f64> {
        match mode {
            Interpolation::Nearest => self.view().sample_cell(p),
            Interpolation::Bilinear => self.view().sample_bilinear(p),
        }
    }
}
