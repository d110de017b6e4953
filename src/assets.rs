//! Image asset loading.
//!
//! Loading is fire-and-forget: a decode thread works through the image list
//! and delivers results over a channel that the frame loop drains without
//! blocking. A surface whose pixels have not arrived (or whose decode failed)
//! keeps rendering with the placeholder material; there are no retries.

/// Decoded RGBA8 pixels ready for texture upload.
#[derive(Clone, Debug)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Build from a raw RGBA8 buffer, e.g. pixels pushed in from a web host.
    /// Returns None if the buffer does not match the dimensions.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        if pixels.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        Some(Self { width, height, pixels })
    }
}

/// Neutral grey checker shown while an image is pending or failed.
pub fn placeholder() -> ImageData {
    let light = [210u8, 210, 210, 255];
    let dark = [170u8, 170, 170, 255];
    let mut pixels = Vec::with_capacity(4 * 4);
    for cell in [light, dark, dark, light] {
        pixels.extend_from_slice(&cell);
    }
    ImageData { width: 2, height: 2, pixels }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::*;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::ImageData;
    use std::path::{Path, PathBuf};
    use std::sync::mpsc::{channel, Receiver};

    /// One finished decode: image index plus pixels or an error description.
    pub type LoadResult = (usize, Result<ImageData, String>);

    /// Decode an image file to RGBA8.
    pub fn decode_file(path: &Path) -> anyhow::Result<ImageData> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(ImageData { width, height, pixels: img.into_raw() })
    }

    /// Background loader for an ordered image list.
    pub struct ImageLoader {
        rx: Receiver<LoadResult>,
    }

    impl ImageLoader {
        /// Start decoding `paths` on a worker thread.
        pub fn spawn(paths: Vec<PathBuf>) -> Self {
            let (tx, rx) = channel();
            std::thread::spawn(move || {
                for (index, path) in paths.into_iter().enumerate() {
                    let result = decode_file(&path).map_err(|e| {
                        log::warn!("failed to load {:?}: {}", path, e);
                        e.to_string()
                    });
                    if tx.send((index, result)).is_err() {
                        // Receiver dropped: the gallery was torn down.
                        return;
                    }
                }
            });
            Self { rx }
        }

        /// Drain whatever has finished since the last poll. Never blocks.
        pub fn poll(&self) -> Vec<LoadResult> {
            self.rx.try_iter().collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_valid_rgba() {
        let p = placeholder();
        assert_eq!(p.pixels.len(), (p.width * p.height * 4) as usize);
    }

    #[test]
    fn test_from_rgba8_validates_len() {
        assert!(ImageData::from_rgba8(2, 2, vec![0; 16]).is_some());
        assert!(ImageData::from_rgba8(2, 2, vec![0; 15]).is_none());
        assert!(ImageData::from_rgba8(0, 2, vec![]).is_none());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_missing_file_reports_error() {
        let result = decode_file(std::path::Path::new("/nonexistent/image.png"));
        assert!(result.is_err());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_loader_delivers_failures_without_blocking() {
        let loader = ImageLoader::spawn(vec![std::path::PathBuf::from("/nonexistent/a.png")]);
        // The worker finishes quickly for a missing file; poll until it does.
        let mut results = Vec::new();
        for _ in 0..200 {
            results.extend(loader.poll());
            if !results.is_empty() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, 0);
        assert!(results[0].1.is_err());
    }
}
