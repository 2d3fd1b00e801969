//! Screenshot baseline comparison
//!
//! Advisory visual check for the screenshots a batch produced: each captured
//! artifact can be compared against a stored baseline of the same name. The
//! verdict never changes a scenario's pass/fail status, which comes from the
//! runner alone; callers surface mismatches alongside the report.

use std::path::{Path, PathBuf};

use image::{GenericImageView, Pixel, RgbaImage};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};

/// Small per-channel differences (anti-aliasing, compression) are ignored
const CHANNEL_TOLERANCE: i32 = 5;

/// Outcome of comparing one screenshot against its baseline
#[derive(Debug, Clone)]
pub struct ScreenshotDiff {
    /// Whether the images match within the allowed percentage
    pub matches: bool,

    /// Percentage of pixels that differ
    pub diff_percent: f64,

    pub diff_pixels: u64,
    pub total_pixels: u64,

    /// Diff image highlighting changed pixels, when any differ
    pub diff_image: Option<PathBuf>,
}

/// Configuration for baseline comparison
#[derive(Debug, Clone)]
pub struct VisualConfig {
    /// Directory holding baseline screenshots
    pub baseline_dir: PathBuf,

    /// Directory the batch wrote its screenshots to
    pub captured_dir: PathBuf,

    /// Directory diff images are written to
    pub diff_dir: PathBuf,

    /// Allowed pixel difference (0.0 - 100.0 percent)
    pub max_diff_percent: f64,

    /// Adopt captured screenshots as baselines when none exist
    pub adopt_missing: bool,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            baseline_dir: PathBuf::from("test-results/baselines"),
            captured_dir: uatbot_common::default_screenshot_dir(),
            diff_dir: PathBuf::from("test-results/diffs"),
            max_diff_percent: 0.5,
            adopt_missing: false,
        }
    }
}

/// Compares captured screenshots against a baseline set
pub struct BaselineComparer {
    config: VisualConfig,
}

impl BaselineComparer {
    pub fn new(config: VisualConfig) -> EngineResult<Self> {
        std::fs::create_dir_all(&config.baseline_dir)?;
        std::fs::create_dir_all(&config.captured_dir)?;
        std::fs::create_dir_all(&config.diff_dir)?;
        Ok(Self { config })
    }

    /// Compare one captured screenshot (by file name, e.g.
    /// `screenshot_42_initial.png`) against its baseline.
    pub fn compare(&self, file_name: &str) -> EngineResult<ScreenshotDiff> {
        let captured_path = self.config.captured_dir.join(file_name);
        let baseline_path = self.config.baseline_dir.join(file_name);

        if !captured_path.exists() {
            return Err(EngineError::Visual(format!(
                "Captured screenshot not found: {}",
                captured_path.display()
            )));
        }

        if !baseline_path.exists() {
            if self.config.adopt_missing {
                info!("Adopting baseline for '{}'", file_name);
                std::fs::copy(&captured_path, &baseline_path)?;
                return Ok(ScreenshotDiff {
                    matches: true,
                    diff_percent: 0.0,
                    diff_pixels: 0,
                    total_pixels: 0,
                    diff_image: None,
                });
            }
            return Err(EngineError::BaselineNotFound(
                baseline_path.to_string_lossy().to_string(),
            ));
        }

        // Hash shortcut: byte-identical files need no pixel walk
        if hash_file(&captured_path)? == hash_file(&baseline_path)? {
            debug!("'{}' matches baseline exactly", file_name);
            let img = image::open(&captured_path)?;
            return Ok(ScreenshotDiff {
                matches: true,
                diff_percent: 0.0,
                diff_pixels: 0,
                total_pixels: (img.width() as u64) * (img.height() as u64),
                diff_image: None,
            });
        }

        let captured = image::open(&captured_path)?;
        let baseline = image::open(&baseline_path)?;

        if captured.dimensions() != baseline.dimensions() {
            warn!(
                "Screenshot dimensions differ for '{}': {:?} vs baseline {:?}",
                file_name,
                captured.dimensions(),
                baseline.dimensions()
            );
        }

        let (width, height) = captured.dimensions();
        let captured_rgba = captured.to_rgba8();
        let baseline_rgba = baseline.to_rgba8();

        let mut diff_img = RgbaImage::new(width, height);
        let mut diff_pixels = 0u64;
        let total_pixels = (width as u64) * (height as u64);

        for y in 0..height.min(baseline.height()) {
            for x in 0..width.min(baseline.width()) {
                let a = captured_rgba.get_pixel(x, y);
                let b = baseline_rgba.get_pixel(x, y);

                if pixels_differ(a, b) {
                    diff_pixels += 1;
                    diff_img.put_pixel(x, y, image::Rgba([255, 0, 0, 255]));
                } else {
                    let channels = a.channels();
                    diff_img.put_pixel(
                        x,
                        y,
                        image::Rgba([channels[0] / 2, channels[1] / 2, channels[2] / 2, 128]),
                    );
                }
            }
        }

        let diff_percent = diff_pixels as f64 / total_pixels as f64 * 100.0;
        let matches = diff_percent <= self.config.max_diff_percent;

        let diff_image = if diff_pixels > 0 {
            let stem = Path::new(file_name)
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| file_name.to_string());
            let path = self.config.diff_dir.join(format!("{stem}-diff.png"));
            diff_img.save(&path)?;
            Some(path)
        } else {
            None
        };

        if !matches {
            warn!(
                "Visual mismatch in '{}': {:.2}% pixels differ (allowed: {:.2}%)",
                file_name, diff_percent, self.config.max_diff_percent
            );
        }

        Ok(ScreenshotDiff {
            matches,
            diff_percent,
            diff_pixels,
            total_pixels,
            diff_image,
        })
    }

    /// Promote a captured screenshot to be the new baseline
    pub fn update_baseline(&self, file_name: &str) -> EngineResult<()> {
        let captured_path = self.config.captured_dir.join(file_name);
        if !captured_path.exists() {
            return Err(EngineError::Visual(format!(
                "Cannot update baseline, capture missing: {}",
                captured_path.display()
            )));
        }
        std::fs::copy(&captured_path, self.config.baseline_dir.join(file_name))?;
        info!("Updated baseline for '{}'", file_name);
        Ok(())
    }
}

fn pixels_differ(a: &image::Rgba<u8>, b: &image::Rgba<u8>) -> bool {
    let a_channels = a.channels();
    let b_channels = b.channels();
    for i in 0..4 {
        if (a_channels[i] as i32 - b_channels[i] as i32).abs() > CHANNEL_TOLERANCE {
            return true;
        }
    }
    false
}

fn hash_file(path: &Path) -> EngineResult<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &Path, color: [u8; 4]) {
        let img = RgbaImage::from_pixel(8, 8, image::Rgba(color));
        img.save(path).unwrap();
    }

    fn comparer(root: &Path, adopt_missing: bool) -> BaselineComparer {
        BaselineComparer::new(VisualConfig {
            baseline_dir: root.join("baselines"),
            captured_dir: root.join("captured"),
            diff_dir: root.join("diffs"),
            max_diff_percent: 0.5,
            adopt_missing,
        })
        .unwrap()
    }

    #[test]
    fn test_identical_images_match() {
        let dir = tempfile::tempdir().unwrap();
        let cmp = comparer(dir.path(), false);

        write_png(&dir.path().join("captured/shot.png"), [10, 20, 30, 255]);
        write_png(&dir.path().join("baselines/shot.png"), [10, 20, 30, 255]);

        let diff = cmp.compare("shot.png").unwrap();
        assert!(diff.matches);
        assert_eq!(diff.diff_pixels, 0);
        assert!(diff.diff_image.is_none());
    }

    #[test]
    fn test_differing_images_produce_diff() {
        let dir = tempfile::tempdir().unwrap();
        let cmp = comparer(dir.path(), false);

        write_png(&dir.path().join("captured/shot.png"), [255, 255, 255, 255]);
        write_png(&dir.path().join("baselines/shot.png"), [0, 0, 0, 255]);

        let diff = cmp.compare("shot.png").unwrap();
        assert!(!diff.matches);
        assert_eq!(diff.diff_pixels, 64);
        assert_eq!(diff.total_pixels, 64);
        assert!(diff.diff_image.is_some());
        assert!(diff.diff_image.unwrap().exists());
    }

    #[test]
    fn test_tolerance_ignores_small_shifts() {
        let dir = tempfile::tempdir().unwrap();
        let cmp = comparer(dir.path(), false);

        write_png(&dir.path().join("captured/shot.png"), [100, 100, 100, 255]);
        write_png(&dir.path().join("baselines/shot.png"), [103, 100, 98, 255]);

        let diff = cmp.compare("shot.png").unwrap();
        assert!(diff.matches);
        assert_eq!(diff.diff_pixels, 0);
    }

    #[test]
    fn test_missing_baseline_errors_without_adoption() {
        let dir = tempfile::tempdir().unwrap();
        let cmp = comparer(dir.path(), false);
        write_png(&dir.path().join("captured/shot.png"), [1, 2, 3, 255]);

        let err = cmp.compare("shot.png").unwrap_err();
        assert!(matches!(err, EngineError::BaselineNotFound(_)));
    }

    #[test]
    fn test_missing_baseline_adopted_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let cmp = comparer(dir.path(), true);
        write_png(&dir.path().join("captured/shot.png"), [1, 2, 3, 255]);

        let diff = cmp.compare("shot.png").unwrap();
        assert!(diff.matches);
        assert!(dir.path().join("baselines/shot.png").exists());
    }

    #[test]
    fn test_update_baseline_copies_capture() {
        let dir = tempfile::tempdir().unwrap();
        let cmp = comparer(dir.path(), false);
        write_png(&dir.path().join("captured/shot.png"), [9, 9, 9, 255]);

        cmp.update_baseline("shot.png").unwrap();
        assert!(dir.path().join("baselines/shot.png").exists());
    }
}
