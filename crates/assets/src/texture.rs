use crate::error::AssetError;
use std::path::{Path, PathBuf};

/// Decoded RGBA8 pixels, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Decode an image file, expanding any channel layout to RGBA8.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        tracing::debug!(path = %path.display(), width, height, "decoded image");
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// A single-pixel image of one color.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

/// The six faces of a skybox in cube layer order (+X, -X, +Y, -Y, +Z, -Z).
///
/// A face that failed to load is `None`; its layer stays unpopulated on the
/// GPU and renders black.
#[derive(Debug, Clone)]
pub struct CubemapFaces {
    /// Edge length shared by every face.
    pub size: u32,
    pub faces: [Option<ImageData>; 6],
}

impl CubemapFaces {
    /// Load all six faces. Never fails as a whole: each face that cannot be
    /// decoded, or that is not square, or does not match the first square face's size, is
    /// logged with its path and skipped.
    pub fn load(paths: &[PathBuf; 6]) -> Self {
        let mut size = None;
        let mut faces: [Option<ImageData>; 6] = Default::default();

        for (slot, path) in faces.iter_mut().zip(paths) {
            let image = match ImageData::load(path) {
                Ok(image) => image,
                Err(e) => {
                    tracing::error!(
                        "cubemap face failed to load at path {}: {e}",
                        path.display()
                    );
                    continue;
                }
            };

            if image.width != image.height {
                tracing::error!(
                    "cubemap face {} is {}x{}, faces must be square",
                    path.display(),
                    image.width,
                    image.height
                );
                continue;
            }
            let expected = *size.get_or_insert(image.width);
            if image.width != expected {
                tracing::error!(
                    "cubemap face {} is {}x{}, expected {expected}x{expected}",
                    path.display(),
                    image.width,
                    image.height
                );
                continue;
            }
            *slot = Some(image);
        }

        let cubemap = Self {
            size: size.unwrap_or(1),
            faces,
        };
        tracing::info!(
            loaded = cubemap.loaded_count(),
            size = cubemap.size,
            "loaded skybox cubemap"
        );
        cubemap
    }

    pub fn loaded_count(&self) -> usize {
        self.faces.iter().filter(|f| f.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(dir: &Path, name: &str, w: u32, h: u32, color: [u8; 4]) -> PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(w, h, Rgba(color)).save(&path).unwrap();
        path
    }

    #[test]
    fn load_png_as_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "a.png", 3, 2, [10, 20, 30, 255]);
        let image = ImageData::load(&path).unwrap();
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.pixels.len(), 3 * 2 * 4);
        assert_eq!(&image.pixels[..4], &[10, 20, 30, 255]);
        assert_eq!(image.bytes_per_row(), 12);
    }

    #[test]
    fn missing_image_is_an_error() {
        let err = ImageData::load("/definitely/not/here.png").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.png"));
    }

    #[test]
    fn cubemap_with_missing_faces_keeps_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let names = ["right", "left", "top", "bottom", "front", "back"];
        let paths: [PathBuf; 6] = names.map(|n| dir.path().join(format!("{n}.png")));
        for (i, path) in paths.iter().enumerate() {
            if i != 2 {
                RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]))
                    .save(path)
                    .unwrap();
            }
        }

        let cubemap = CubemapFaces::load(&paths);
        assert_eq!(cubemap.size, 4);
        assert_eq!(cubemap.loaded_count(), 5);
        assert!(cubemap.faces[2].is_none());
        assert!(cubemap.faces[0].is_some());
    }

    #[test]
    fn mismatched_face_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths: Vec<PathBuf> = Vec::new();
        for i in 0..6 {
            let size = if i == 4 { 8 } else { 4 };
            let name = format!("{i}.png");
            paths.push(write_png(dir.path(), &name, size, size, [1, 2, 3, 255]));
        }
        let paths: [PathBuf; 6] = paths.try_into().unwrap();
        let cubemap = CubemapFaces::load(&paths);
        assert_eq!(cubemap.loaded_count(), 5);
        assert!(cubemap.faces[4].is_none());
    }

    #[test]
    fn non_square_first_face_does_not_set_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths: Vec<PathBuf> = Vec::new();
        for i in 0..6 {
            let (w, h) = if i == 0 { (8, 4) } else { (4, 4) };
            paths.push(write_png(dir.path(), &format!("{i}.png"), w, h, [9, 9, 9, 255]));
        }
        let paths: [PathBuf; 6] = paths.try_into().unwrap();
        let cubemap = CubemapFaces::load(&paths);
        assert_eq!(cubemap.size, 4);
        assert_eq!(cubemap.loaded_count(), 5);
        assert!(cubemap.faces[0].is_none());
        assert!(cubemap.faces[1..].iter().all(Option::is_some));
    }

    #[test]
    fn no_faces_gives_placeholder_size() {
        let paths: [PathBuf; 6] =
            std::array::from_fn(|i| PathBuf::from(format!("/missing/{i}.png")));
        let cubemap = CubemapFaces::load(&paths);
        assert_eq!(cubemap.size, 1);
        assert_eq!(cubemap.loaded_count(), 0);
    }
}
