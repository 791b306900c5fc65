//! Template loading, superposition rendering and PNG export

use crate::algorithm::executor::Model;
use crate::io::configuration::CONTRADICTION_COLOR;
use crate::io::error::{ModelError, Result, WithPath, invalid_parameter};
use crate::spatial::tiles::{Pattern, PixelFormat, Template};
use image::{DynamicImage, ImageBuffer, Luma, LumaA, Rgb, Rgba};
use ndarray::{Array3, ArrayView3, s};
use std::path::{Path, PathBuf};

/// Convert a decoded image into a template, keeping its channel layout and bit depth
///
/// 8- and 16-bit gray, gray+alpha, RGB and RGBA images keep their layout; any other
/// pixel type is converted to 8-bit RGBA. 16-bit samples are stored as native-endian
/// byte pairs.
///
/// # Errors
///
/// Returns an error if the decoded buffer does not match its reported dimensions
pub fn template_from_image(image: DynamicImage) -> Result<Template> {
    let width = image.width() as usize;
    let height = image.height() as usize;

    let (format, data) = match image {
        DynamicImage::ImageLuma8(buffer) => (PixelFormat::new(1, 1), buffer.into_raw()),
        DynamicImage::ImageLumaA8(buffer) => (PixelFormat::new(2, 1), buffer.into_raw()),
        DynamicImage::ImageRgb8(buffer) => (PixelFormat::new(3, 1), buffer.into_raw()),
        DynamicImage::ImageRgba8(buffer) => (PixelFormat::new(4, 1), buffer.into_raw()),
        DynamicImage::ImageLuma16(buffer) => {
            (PixelFormat::new(1, 2), samples_to_bytes(&buffer.into_raw()))
        }
        DynamicImage::ImageLumaA16(buffer) => {
            (PixelFormat::new(2, 2), samples_to_bytes(&buffer.into_raw()))
        }
        DynamicImage::ImageRgb16(buffer) => {
            (PixelFormat::new(3, 2), samples_to_bytes(&buffer.into_raw()))
        }
        DynamicImage::ImageRgba16(buffer) => {
            (PixelFormat::new(4, 2), samples_to_bytes(&buffer.into_raw()))
        }
        other => (PixelFormat::new(4, 1), other.to_rgba8().into_raw()),
    };

    Template::new(width, height, format, data)
}

/// Load a single image file as a template
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded
pub fn load_template(path: &Path) -> Result<Template> {
    let image = image::open(path).with_path(path)?;
    template_from_image(image)
}

/// Load a PNG file, or every PNG file in a directory sorted by path
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be read
/// - The target is neither a PNG file nor a directory containing one
/// - Any of the images cannot be decoded
pub fn load_templates(target: &Path) -> Result<Vec<Template>> {
    let files = collect_png_files(target)?;
    if files.is_empty() {
        return Err(invalid_parameter(
            "templates",
            &target.display(),
            &"no PNG files found",
        ));
    }
    files.iter().map(|path| load_template(path)).collect()
}

/// PNG files named by `target`, sorted by path
///
/// # Errors
///
/// Returns an error if `target` is a directory that cannot be listed
pub fn collect_png_files(target: &Path) -> Result<Vec<PathBuf>> {
    if target.is_file() {
        return Ok(if is_png(target) {
            vec![target.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let entries = std::fs::read_dir(target).map_err(|e| ModelError::FileSystem {
        path: target.to_path_buf(),
        operation: "read directory",
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.with_path(target)?.path();
        if path.is_file() && is_png(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

/// Paint the model's current superpositions into an output image
///
/// Cells are painted in row-major order, each covering the pattern-sized block
/// anchored at its position, so later cells overwrite the overlap of earlier ones.
/// A block shows the sample-wise average of the cell's possible patterns; cells
/// without any possible pattern are painted [`CONTRADICTION_COLOR`].
///
/// # Errors
///
/// Returns an error if the output buffer cannot be allocated for the pattern format
pub fn render(model: &Model) -> Result<Template> {
    let catalog = model.catalog();
    let config = model.config();
    let format = catalog
        .format()
        .ok_or_else(|| invalid_parameter("templates", &0, &"the pattern catalog is empty"))?;
    let size = catalog.pattern_size();

    let mut output = Template::new(
        config.output_width,
        config.output_height,
        format,
        vec![0; config.output_width * config.output_height * format.bytes_per_pixel()],
    )?;
    let sentinel = sentinel_block(format, size);

    let wave = model.wave();
    let shape = wave.shape();
    for row in 0..shape.height {
        for col in 0..shape.width {
            let patterns: Vec<&Pattern> = wave
                .superposition(shape.index(col, row))
                .into_iter()
                .filter_map(|id| catalog.pattern(id))
                .collect();

            let mut target = output
                .pixels_mut()
                .slice_mut(s![row..row + size, col..col + size, ..]);
            if patterns.is_empty() {
                target.assign(&sentinel);
            } else {
                target.assign(&average_patterns(&patterns, format));
            }
        }
    }

    Ok(output)
}

/// Write a template to disk as a PNG, creating parent directories
///
/// # Errors
///
/// Returns an error if:
/// - The pixel format has no PNG equivalent
/// - The parent directory cannot be created
/// - The image cannot be encoded or written
pub fn save_png(template: &Template, path: &Path) -> Result<()> {
    let image = to_dynamic_image(template)?;

    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ModelError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    image.save(path).map_err(|e| ModelError::ImageExport {
        path: path.to_path_buf(),
        source: e,
    })
}

fn to_dynamic_image(template: &Template) -> Result<DynamicImage> {
    let width = u32::try_from(template.width())
        .map_err(|e| invalid_parameter("width", &template.width(), &e))?;
    let height = u32::try_from(template.height())
        .map_err(|e| invalid_parameter("height", &template.height(), &e))?;
    let format = template.format();
    let bytes = template.to_bytes();

    let image = match (format.channels, format.depth) {
        (1, 1) => ImageBuffer::<Luma<u8>, _>::from_raw(width, height, bytes)
            .map(DynamicImage::ImageLuma8),
        (2, 1) => ImageBuffer::<LumaA<u8>, _>::from_raw(width, height, bytes)
            .map(DynamicImage::ImageLumaA8),
        (3, 1) => ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, bytes)
            .map(DynamicImage::ImageRgb8),
        (4, 1) => ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, bytes)
            .map(DynamicImage::ImageRgba8),
        (1, 2) => ImageBuffer::<Luma<u16>, _>::from_raw(width, height, bytes_to_samples(&bytes))
            .map(DynamicImage::ImageLuma16),
        (2, 2) => ImageBuffer::<LumaA<u16>, _>::from_raw(width, height, bytes_to_samples(&bytes))
            .map(DynamicImage::ImageLumaA16),
        (3, 2) => ImageBuffer::<Rgb<u16>, _>::from_raw(width, height, bytes_to_samples(&bytes))
            .map(DynamicImage::ImageRgb16),
        (4, 2) => ImageBuffer::<Rgba<u16>, _>::from_raw(width, height, bytes_to_samples(&bytes))
            .map(DynamicImage::ImageRgba16),
        _ => None,
    };

    image.ok_or_else(|| {
        invalid_parameter(
            "format",
            &format!("{} channels x {} bytes", format.channels, format.depth),
            &"no matching PNG pixel layout",
        )
    })
}

fn samples_to_bytes(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|sample| sample.to_ne_bytes()).collect()
}

fn bytes_to_samples(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| <[u8; 2]>::try_from(pair).map_or(0, u16::from_ne_bytes))
        .collect()
}

// 16-bit samples are averaged as whole values; every other depth byte by byte
const fn sample_width(format: PixelFormat) -> usize {
    if format.depth == 2 { 2 } else { 1 }
}

fn read_sample(pixels: &ArrayView3<'_, u8>, row: usize, col: usize, byte: usize, width: usize) -> u64 {
    if width == 2 {
        let first = pixels.get((row, col, byte)).copied().unwrap_or(0);
        let second = pixels.get((row, col, byte + 1)).copied().unwrap_or(0);
        u64::from(u16::from_ne_bytes([first, second]))
    } else {
        u64::from(pixels.get((row, col, byte)).copied().unwrap_or(0))
    }
}

fn write_sample(block: &mut Array3<u8>, row: usize, col: usize, byte: usize, width: usize, value: u64) {
    if width == 2 {
        let sample = u16::try_from(value).unwrap_or(u16::MAX).to_ne_bytes();
        for (i, part) in sample.into_iter().enumerate() {
            if let Some(slot) = block.get_mut((row, col, byte + i)) {
                *slot = part;
            }
        }
    } else if let Some(slot) = block.get_mut((row, col, byte)) {
        *slot = u8::try_from(value).unwrap_or(u8::MAX);
    }
}

// Samples are divided before summing, so the result can undershoot the mean by up to n - 1
fn average_patterns(patterns: &[&Pattern], format: PixelFormat) -> Array3<u8> {
    let Some(first) = patterns.first() else {
        return Array3::zeros((0, 0, 0));
    };
    let (rows, cols, bytes) = first.pixels().dim();
    let width = sample_width(format);
    let n = patterns.len() as u64;

    let mut block = Array3::zeros((rows, cols, bytes));
    for row in 0..rows {
        for col in 0..cols {
            for byte in (0..bytes).step_by(width) {
                let value: u64 = patterns
                    .iter()
                    .map(|pattern| read_sample(&pattern.pixels(), row, col, byte, width) / n)
                    .sum();
                write_sample(&mut block, row, col, byte, width, value);
            }
        }
    }
    block
}

/// Per-pixel bytes of [`CONTRADICTION_COLOR`] in the given format
pub fn sentinel_pixel(format: PixelFormat) -> Vec<u8> {
    let [red, green, blue, alpha] = CONTRADICTION_COLOR;
    let channels: Vec<u8> = match format.channels {
        1 => vec![red],
        2 => vec![red, alpha],
        3 => vec![red, green, blue],
        4 => vec![red, green, blue, alpha],
        n => std::iter::repeat_n(red, usize::from(n)).collect(),
    };

    if format.depth == 2 {
        channels
            .into_iter()
            .flat_map(|value| (u16::from(value) * 257).to_ne_bytes())
            .collect()
    } else {
        channels
            .into_iter()
            .flat_map(|value| std::iter::repeat_n(value, usize::from(format.depth)))
            .collect()
    }
}

fn sentinel_block(format: PixelFormat, size: usize) -> Array3<u8> {
    let pixel = sentinel_pixel(format);
    let bytes = pixel.len();
    Array3::from_shape_fn((size, size, bytes), |(_, _, k)| {
        pixel.get(k).copied().unwrap_or(0)
    })
}
