//! Image codec seam: open, coalesce, resize and write multi-frame images
//!
//! [`ImageCodec`] is the boundary between resize policy and pixel work. The
//! production implementation, [`ImageCrateCodec`], is backed by the `image`
//! crate and treats GIF as an animation; every other format is a single frame.

use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::{AnimationDecoder, ColorType, Delay, DynamicImage, Frame, ImageFormat, RgbaImage};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::config::ProcessingConfig;
use crate::error::{ErrorContext, Result, ResizerError};
use crate::processing::formats::{output_format, requires_rgb, supports_animation};
use crate::processing::resize::{resize_exact, FilterType};
use crate::processing::ImageDimensions;

/// One frame of an image, positioned on the animation canvas
#[derive(Debug, Clone)]
pub struct ImageFrame {
    image: DynamicImage,
    left: u32,
    top: u32,
    delay: Delay,
}

impl ImageFrame {
    /// A full-canvas frame without delay
    pub fn new(image: DynamicImage) -> Self {
        Self::from_parts(image, 0, 0, Delay::from_numer_denom_ms(0, 1))
    }

    pub fn from_parts(image: DynamicImage, left: u32, top: u32, delay: Delay) -> Self {
        Self { image, left, top, delay }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn offset(&self) -> (u32, u32) {
        (self.left, self.top)
    }

    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.image.width(), self.image.height())
    }

    fn to_animation_frame(&self) -> Frame {
        Frame::from_parts(self.image.to_rgba8(), self.left, self.top, self.delay)
    }
}

impl From<Frame> for ImageFrame {
    fn from(frame: Frame) -> Self {
        let (left, top, delay) = (frame.left(), frame.top(), frame.delay());
        Self::from_parts(DynamicImage::ImageRgba8(frame.into_buffer()), left, top, delay)
    }
}

/// All frames of one decoded file
#[derive(Debug, Clone)]
pub struct ImageCollection {
    format: ImageFormat,
    frames: Vec<ImageFrame>,
}

impl ImageCollection {
    pub fn new(format: ImageFormat, frames: Vec<ImageFrame>) -> Self {
        Self { format, frames }
    }

    pub fn single(format: ImageFormat, image: DynamicImage) -> Self {
        Self::new(format, vec![ImageFrame::new(image)])
    }

    /// Format the file was decoded from
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn frames(&self) -> &[ImageFrame] {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut [ImageFrame] {
        &mut self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Smallest canvas holding every frame at its offset
    pub fn canvas(&self) -> ImageDimensions {
        self.frames.iter().fold(ImageDimensions::new(0, 0), |canvas, frame| {
            let size = frame.dimensions();
            ImageDimensions::new(
                canvas.width.max(frame.left + size.width),
                canvas.height.max(frame.top + size.height),
            )
        })
    }

    /// Whether every frame already covers the whole canvas
    pub fn is_coalesced(&self) -> bool {
        let canvas = self.canvas();
        self.frames
            .iter()
            .all(|frame| frame.offset() == (0, 0) && frame.dimensions() == canvas)
    }

    /// Replace partial frames by the full picture visible at that point of
    /// the animation, each drawn over its predecessors.
    pub fn coalesce(&mut self) {
        if self.is_coalesced() {
            return;
        }

        let canvas = self.canvas();
        debug!("Coalescing {} frames onto a {} canvas", self.frames.len(), canvas);

        let mut composite = RgbaImage::new(canvas.width, canvas.height);
        for frame in &mut self.frames {
            image::imageops::overlay(
                &mut composite,
                &frame.image.to_rgba8(),
                i64::from(frame.left),
                i64::from(frame.top),
            );
            frame.image = DynamicImage::ImageRgba8(composite.clone());
            frame.left = 0;
            frame.top = 0;
        }
    }
}

/// Pixel operations needed by the processing engine
pub trait ImageCodec {
    /// Decode every frame of `path`
    fn open(&self, path: &Path) -> Result<ImageCollection>;

    /// Make every frame an independent, canvas-sized buffer
    fn coalesce(&self, collection: &mut ImageCollection) {
        collection.coalesce();
    }

    /// Resize one frame to exactly `target`
    fn resize_frame(&self, frame: &mut ImageFrame, target: ImageDimensions);

    /// Encode the collection to `path`, format chosen by its extension
    fn write(&self, collection: &ImageCollection, path: &Path) -> Result<()>;
}

/// [`ImageCodec`] backed by the `image` crate
#[derive(Debug, Clone)]
pub struct ImageCrateCodec {
    filter: FilterType,
    jpeg_quality: u8,
}

impl ImageCrateCodec {
    pub fn new(filter: FilterType, jpeg_quality: u8) -> Self {
        Self {
            filter,
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self::new(config.filter, config.jpeg_quality)
    }

    fn write_animation<W: Write>(&self, collection: &ImageCollection, writer: W, path: &Path) -> Result<()> {
        let mut encoder = GifEncoder::new(writer);
        encoder.set_repeat(Repeat::Infinite).encode_context(path)?;
        encoder
            .encode_frames(collection.frames().iter().map(ImageFrame::to_animation_frame))
            .encode_context(path)
    }

    fn write_jpeg<W: Write>(&self, image: &DynamicImage, writer: W, path: &Path) -> Result<()> {
        let rgb = image.to_rgb8();
        JpegEncoder::new_with_quality(writer, self.jpeg_quality)
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            .encode_context(path)
    }

    fn encode<W: Write + Seek>(
        &self,
        collection: &ImageCollection,
        format: ImageFormat,
        writer: &mut W,
        path: &Path,
    ) -> Result<()> {
        if supports_animation(format) && collection.len() > 1 {
            return self.write_animation(collection, writer, path);
        }

        let first = collection
            .frames()
            .first()
            .ok_or_else(|| ResizerError::encode(path, "image contains no frames"))?;

        if collection.len() > 1 {
            warn!(
                "{:?} cannot hold {} frames; writing the first frame only",
                format,
                collection.len()
            );
        }

        if requires_rgb(format) {
            return self.write_jpeg(first.image(), writer, path);
        }

        first.image().write_to(writer, format).encode_context(path)
    }
}

/// Sibling temporary file that replaces `path` only once fully written
fn staging_file(path: &Path) -> Result<NamedTempFile> {
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    tempfile::Builder::new()
        .prefix(".imageresizer-")
        .tempfile_in(directory)
        .encode_context(path)
}

impl Default for ImageCrateCodec {
    fn default() -> Self {
        Self::from_config(&ProcessingConfig::default())
    }
}

impl ImageCodec for ImageCrateCodec {
    fn open(&self, path: &Path) -> Result<ImageCollection> {
        debug!("Opening image: {:?}", path);

        let reader = image::io::Reader::open(path)
            .decode_context(path)?
            .with_guessed_format()
            .decode_context(path)?;

        let format = reader
            .format()
            .ok_or_else(|| ResizerError::decode(path, "unrecognized image format"))?;

        if supports_animation(format) {
            let decoder = GifDecoder::new(reader.into_inner()).decode_context(path)?;
            let frames = decoder.into_frames().collect_frames().decode_context(path)?;
            if frames.is_empty() {
                return Err(ResizerError::decode(path, "image contains no frames"));
            }
            debug!("Decoded {} animation frames from {:?}", frames.len(), path);
            return Ok(ImageCollection::new(
                format,
                frames.into_iter().map(ImageFrame::from).collect(),
            ));
        }

        let image = reader.decode().decode_context(path)?;
        Ok(ImageCollection::single(format, image))
    }

    fn resize_frame(&self, frame: &mut ImageFrame, target: ImageDimensions) {
        frame.image = resize_exact(&frame.image, target, self.filter);
    }

    fn write(&self, collection: &ImageCollection, path: &Path) -> Result<()> {
        let format = output_format(path, collection.format());
        debug!("Writing {} frame(s) to {:?} as {:?}", collection.len(), path, format);

        let mut writer = BufWriter::new(staging_file(path)?);
        self.encode(collection, format, &mut writer, path)?;
        let staged = writer.into_inner().encode_context(path)?;

        if let Ok(metadata) = std::fs::metadata(path) {
            if let Err(e) = std::fs::set_permissions(staged.path(), metadata.permissions()) {
                debug!("Permissions of {:?} not carried over: {}", path, e);
            }
        }

        staged.persist(path).encode_context(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbImage};
    use std::fs::File;
    use tempfile::TempDir;

    fn write_gif(path: &Path, frames: Vec<Frame>) {
        let file = File::create(path).unwrap();
        let mut encoder = GifEncoder::new(file);
        encoder.encode_frames(frames).unwrap();
    }

    fn solid_frame(width: u32, height: u32, color: [u8; 4]) -> Frame {
        Frame::new(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    #[test]
    fn test_open_single_frame_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.png");
        RgbImage::new(40, 20).save(&path).unwrap();

        let collection = ImageCrateCodec::default().open(&path).unwrap();
        assert_eq!(collection.format(), ImageFormat::Png);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.frames()[0].dimensions(), ImageDimensions::new(40, 20));
    }

    #[test]
    fn test_open_detects_format_from_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("misnamed.jpg");
        RgbImage::new(8, 8).save_with_format(&path, ImageFormat::Png).unwrap();

        let collection = ImageCrateCodec::default().open(&path).unwrap();
        assert_eq!(collection.format(), ImageFormat::Png);
    }

    #[test]
    fn test_open_corrupt_file_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let err = ImageCrateCodec::default().open(&path).unwrap_err();
        assert!(matches!(err, ResizerError::Decode { .. }));
        assert_eq!(err.file_path(), Some(path.as_path()));
    }

    #[test]
    fn test_gif_animation_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("anim.gif");
        write_gif(&path, vec![
            solid_frame(30, 20, [255, 0, 0, 255]),
            solid_frame(30, 20, [0, 255, 0, 255]),
            solid_frame(30, 20, [0, 0, 255, 255]),
        ]);

        let codec = ImageCrateCodec::new(FilterType::Nearest, 90);
        let mut collection = codec.open(&path).unwrap();
        assert_eq!(collection.len(), 3);

        codec.coalesce(&mut collection);
        for frame in collection.frames_mut() {
            codec.resize_frame(frame, ImageDimensions::new(15, 10));
        }

        let out = dir.path().join("small.gif");
        codec.write(&collection, &out).unwrap();

        let reopened = codec.open(&out).unwrap();
        assert_eq!(reopened.len(), 3);
        assert!(reopened.frames().iter().all(|f| f.dimensions() == ImageDimensions::new(15, 10)));
    }

    #[test]
    fn test_coalesce_draws_partial_frames_over_predecessors() {
        let base = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])));
        let patch = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255])));
        let delay = Delay::from_numer_denom_ms(100, 1);

        let mut collection = ImageCollection::new(ImageFormat::Gif, vec![
            ImageFrame::from_parts(base, 0, 0, delay),
            ImageFrame::from_parts(patch, 2, 2, delay),
        ]);
        assert!(!collection.is_coalesced());

        collection.coalesce();

        assert!(collection.is_coalesced());
        let second = collection.frames()[1].image().to_rgba8();
        assert_eq!(second.dimensions(), (4, 4));
        assert_eq!(second.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(second.get_pixel(3, 3), &Rgba([0, 0, 255, 255]));
        assert_eq!(collection.frames()[1].to_animation_frame().delay(), delay);
    }

    #[test]
    fn test_write_jpeg_flattens_alpha() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("flat.jpg");
        let collection = ImageCollection::single(
            ImageFormat::Png,
            DynamicImage::ImageRgba8(RgbaImage::new(10, 10)),
        );

        ImageCrateCodec::default().write(&collection, &out).unwrap();
        let reopened = ImageCrateCodec::default().open(&out).unwrap();
        assert_eq!(reopened.format(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_multi_frame_to_still_format_keeps_first_frame() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("first.png");
        let collection = ImageCollection::new(ImageFormat::Gif, vec![
            ImageFrame::new(DynamicImage::new_rgba8(6, 6)),
            ImageFrame::new(DynamicImage::new_rgba8(6, 6)),
        ]);

        ImageCrateCodec::default().write(&collection, &out).unwrap();
        assert_eq!(ImageCrateCodec::default().open(&out).unwrap().len(), 1);
    }

    #[test]
    fn test_write_into_missing_directory_is_encode_error() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("missing").join("out.png");
        let collection = ImageCollection::single(ImageFormat::Png, DynamicImage::new_rgb8(2, 2));

        let err = ImageCrateCodec::default().write(&collection, &out).unwrap_err();
        assert!(matches!(err, ResizerError::Encode { .. }));
    }

    #[test]
    fn test_encode_failure_leaves_destination_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("strip.gif");
        write_gif(&path, vec![solid_frame(100, 1, [9, 9, 9, 255])]);
        let before = std::fs::read(&path).unwrap();

        let too_wide = ImageCollection::single(
            ImageFormat::Gif,
            DynamicImage::ImageRgba8(RgbaImage::new(70_000, 1)),
        );
        let err = ImageCrateCodec::default().write(&too_wide, &path).unwrap_err();

        assert!(matches!(err, ResizerError::Encode { .. }));
        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shared.png");
        RgbImage::new(4, 4).save(&path).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let collection = ImageCollection::single(ImageFormat::Png, DynamicImage::new_rgb8(2, 2));
        ImageCrateCodec::default().write(&collection, &path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
        assert_eq!(image::image_dimensions(&path).unwrap(), (2, 2));
    }
}
