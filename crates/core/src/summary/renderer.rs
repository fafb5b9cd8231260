//! Fixed-layout PNG summary of the persisted dataset.
//!
//! The artifact is a derived cache, not source-of-truth data: each refresh
//! overwrites the single well-known file and there is no versioning. The
//! layout is deterministic - 800x600 canvas, title, total count, refresh
//! time, and up to five ranked name/estimate lines.

use ab_glyph::{FontArc, PxScale};
use chrono::{DateTime, Utc};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rust_decimal::Decimal;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::countries::TopCountry;

/// Canvas size, fixed.
const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

/// File name of the cached artifact inside the cache directory.
pub const SUMMARY_FILE_NAME: &str = "summary.png";

/// Maximum number of ranking lines on the canvas.
const MAX_RANKED_LINES: usize = 5;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
const FOREGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Well-known font locations, tried in order. Rendering degrades to a
/// text-free canvas when none exists, so a headless container without
/// fonts still produces the artifact.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Errors from composing or writing the summary image. The orchestrator
/// logs these and moves on; they never fail a refresh.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to encode summary image: {0}")]
    Encode(String),

    #[error("failed to write summary image: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders the dataset summary and maintains the cached artifact.
#[derive(Clone)]
pub struct SummaryRenderer {
    cache_dir: PathBuf,
    font: Option<FontArc>,
}

impl SummaryRenderer {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        let font = load_system_font();
        if font.is_none() {
            log::warn!("no usable system font found, summary images will omit text");
        }
        Self {
            cache_dir: cache_dir.into(),
            font,
        }
    }

    /// The single well-known location of the cached artifact.
    pub fn artifact_path(&self) -> PathBuf {
        self.cache_dir.join(SUMMARY_FILE_NAME)
    }

    /// Compose the summary canvas and encode it as PNG bytes.
    ///
    /// Tolerates a ranking shorter than five entries and a missing refresh
    /// timestamp (rendered as a placeholder).
    pub fn render(
        &self,
        total: i64,
        top: &[TopCountry],
        last_refreshed: Option<DateTime<Utc>>,
    ) -> Result<Vec<u8>, RenderError> {
        let mut canvas = RgbaImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

        if let Some(font) = &self.font {
            let title = PxScale::from(32.0);
            let body = PxScale::from(24.0);
            let entry = PxScale::from(21.0);

            draw_text_mut(
                &mut canvas,
                FOREGROUND,
                20,
                24,
                title,
                font,
                "Country Data Summary",
            );
            draw_text_mut(
                &mut canvas,
                FOREGROUND,
                20,
                72,
                body,
                font,
                &format!("Total Countries: {}", total),
            );
            draw_text_mut(
                &mut canvas,
                FOREGROUND,
                20,
                104,
                body,
                font,
                &format!("Last Refreshed: {}", format_refreshed(last_refreshed)),
            );
            draw_text_mut(
                &mut canvas,
                FOREGROUND,
                20,
                152,
                body,
                font,
                "Top 5 Countries by Estimated GDP:",
            );

            for (index, country) in top.iter().take(MAX_RANKED_LINES).enumerate() {
                let y = 188 + (index as i32) * 28;
                let line = format!(
                    "{}. {}: ${}",
                    index + 1,
                    country.name,
                    format_estimate(&country.estimated_gdp)
                );
                draw_text_mut(&mut canvas, FOREGROUND, 40, y, entry, font, &line);
            }
        }

        let mut buffer = Cursor::new(Vec::new());
        canvas
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(buffer.into_inner())
    }

    /// Render and overwrite the cached artifact, creating the cache
    /// directory if needed. Returns the artifact path.
    pub fn render_to_cache(
        &self,
        total: i64,
        top: &[TopCountry],
        last_refreshed: Option<DateTime<Utc>>,
    ) -> Result<PathBuf, RenderError> {
        let bytes = self.render(total, top, last_refreshed)?;
        fs::create_dir_all(&self.cache_dir)?;
        let path = self.artifact_path();
        fs::write(&path, bytes)?;
        log::debug!("summary image written to {}", path.display());
        Ok(path)
    }
}

fn load_system_font() -> Option<FontArc> {
    FONT_CANDIDATES.iter().find_map(|candidate| {
        let bytes = fs::read(Path::new(candidate)).ok()?;
        FontArc::try_from_vec(bytes).ok()
    })
}

fn format_refreshed(last_refreshed: Option<DateTime<Utc>>) -> String {
    match last_refreshed {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "never".to_string(),
    }
}

/// Whole-unit amount with thousands separators, e.g. `1,086,956`.
fn format_estimate(value: &Decimal) -> String {
    let rounded = value.round().abs();
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let count = digits.chars().count();
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (count - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

    fn top(entries: &[(&str, Decimal)]) -> Vec<TopCountry> {
        entries
            .iter()
            .map(|(name, estimated_gdp)| TopCountry {
                name: name.to_string(),
                estimated_gdp: *estimated_gdp,
            })
            .collect()
    }

    #[test]
    fn test_render_produces_png_bytes() {
        let dir = tempdir().unwrap();
        let renderer = SummaryRenderer::new(dir.path());

        let at = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        let bytes = renderer
            .render(250, &top(&[("Nigeria", dec!(1000000))]), Some(at))
            .unwrap();

        assert_eq!(&bytes[..4], PNG_MAGIC);
    }

    #[test]
    fn test_render_tolerates_short_ranking_and_missing_timestamp() {
        let dir = tempdir().unwrap();
        let renderer = SummaryRenderer::new(dir.path());

        let entries = top(&[("Aland", dec!(2173913)), ("Nigeria", dec!(1000000))]);
        let bytes = renderer.render(2, &entries, None).unwrap();
        assert_eq!(&bytes[..4], PNG_MAGIC);
    }

    #[test]
    fn test_render_to_cache_writes_fixed_path() {
        let dir = tempdir().unwrap();
        let renderer = SummaryRenderer::new(dir.path().join("cache"));

        let path = renderer.render_to_cache(0, &[], None).unwrap();
        assert_eq!(path, dir.path().join("cache").join(SUMMARY_FILE_NAME));
        let written = std::fs::read(&path).unwrap();
        assert_eq!(&written[..4], PNG_MAGIC);

        // A second render overwrites the same artifact.
        let again = renderer.render_to_cache(1, &[], None).unwrap();
        assert_eq!(again, path);
    }

    #[test]
    fn test_format_estimate_groups_thousands() {
        assert_eq!(format_estimate(&dec!(0)), "0");
        assert_eq!(format_estimate(&dec!(999)), "999");
        assert_eq!(format_estimate(&dec!(1000)), "1,000");
        assert_eq!(format_estimate(&dec!(1086956.52)), "1,086,957");
        assert_eq!(format_estimate(&dec!(2173913043.47)), "2,173,913,043");
    }

    #[test]
    fn test_format_refreshed_placeholder() {
        assert_eq!(format_refreshed(None), "never");
    }
}
