use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};

use screen_probe::raster::{self, ContainerFormat, DecodeError, DecoderConfig, Rgb};
use screen_probe::sampler::PixelSampler;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock error")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("screen-probe-{tag}-{nanos}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn gradient(width: u32, height: u32, channels: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * channels);
    for y in 0..height {
        for x in 0..width {
            pixels.push((x * 7 + y) as u8);
            pixels.push((y * 11) as u8);
            pixels.push((x ^ y).wrapping_mul(13) as u8);
            if channels == 4 {
                pixels.push((255 - x) as u8);
            }
        }
    }
    pixels
}

fn encode_png(pixels: &[u8], width: u32, height: u32, color: ExtendedColorType) -> Vec<u8> {
    let mut out = Vec::new();
    PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive)
        .write_image(pixels, width, height, color)
        .expect("encode png fixture");
    out
}

fn ppm(width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    let mut data = format!("P6\n# qemu screendump\n{width} {height}\n255\n").into_bytes();
    data.extend_from_slice(pixels);
    data
}

#[test]
fn adaptive_filtered_png_matches_reference_decoder() {
    let (width, height) = (37, 23);
    let pixels = gradient(width, height, 3);
    let encoded = encode_png(&pixels, width, height, ExtendedColorType::Rgb8);

    let reference = image::load_from_memory(&encoded)
        .expect("reference decode")
        .to_rgb8();
    let decoded = raster::decode_bytes(&encoded, &DecoderConfig::default()).expect("decode png");

    assert_eq!(raster::sniff(&encoded).expect("sniff"), ContainerFormat::Png);
    assert_eq!((decoded.width(), decoded.height()), (width, height));
    assert_eq!(decoded.bytes_per_pixel(), 3);
    assert_eq!(decoded.as_bytes(), reference.as_raw().as_slice());
}

#[test]
fn red_rgb_png_pixel_queries_respect_bounds() {
    let dir = unique_temp_dir("red-png");
    let path = dir.join("capture.png");
    let encoded = encode_png(&[255u8, 0, 0].repeat(4), 2, 2, ExtendedColorType::Rgb8);
    // IHDR 颜色类型字节：签名 8 + 长度 4 + 类型 4 + 宽高 8 + 位深 1
    assert_eq!(encoded[25], 2);
    std::fs::write(&path, &encoded).expect("write png");

    let sampler = PixelSampler::default();
    assert_eq!(sampler.pixel_at(&path, 0, 0), Some(Rgb::new(255, 0, 0)));
    assert_eq!(sampler.pixel_at(&path, 1, 1), Some(Rgb::new(255, 0, 0)));
    assert_eq!(sampler.pixel_at(&path, 2, 0), None);
    assert_eq!(sampler.pixel_at(&path, 0, 2), None);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn rgba_png_alpha_is_kept_but_ignored_by_queries() {
    let dir = unique_temp_dir("rgba");
    let path = dir.join("capture.png");
    let (width, height) = (16, 9);
    let pixels = gradient(width, height, 4);
    std::fs::write(&path, encode_png(&pixels, width, height, ExtendedColorType::Rgba8))
        .expect("write png");

    let sampler = PixelSampler::default();
    let image = sampler.image(&path).expect("decode rgba");
    assert!(image.has_alpha());
    assert_eq!(image.as_bytes(), pixels.as_slice());

    let offset = (4 * width as usize + 5) * 4;
    let expected = Rgb::new(pixels[offset], pixels[offset + 1], pixels[offset + 2]);
    assert_eq!(sampler.pixel_at(&path, 5, 4), Some(expected));
    assert!(sampler.pixel_near(&path, 5, 4, expected, 0));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn ppm_and_png_of_same_pixels_decode_identically() {
    let dir = unique_temp_dir("formats");
    let (width, height) = (12, 5);
    let pixels = gradient(width, height, 3);

    let ppm_path = dir.join("capture.ppm");
    let png_path = dir.join("capture.png");
    std::fs::write(&ppm_path, ppm(width, height, &pixels)).expect("write ppm");
    std::fs::write(&png_path, encode_png(&pixels, width, height, ExtendedColorType::Rgb8))
        .expect("write png");

    let config = DecoderConfig::default();
    let from_ppm = raster::decode_file(&ppm_path, &config).expect("decode ppm");
    let from_png = raster::decode_file(&png_path, &config).expect("decode png");

    assert_eq!(from_ppm, from_png);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn unknown_container_is_unrecognized() {
    let dir = unique_temp_dir("unknown");
    let path = dir.join("capture.gif");
    std::fs::write(&path, b"GIF89a\x01\x00\x01\x00\x00\x00\x00").expect("write gif");

    let result = raster::decode_file(&path, &DecoderConfig::default());
    assert!(matches!(result, Err(DecodeError::UnrecognizedFormat(_))));

    let missing = raster::decode_file(&dir.join("missing.ppm"), &DecoderConfig::default());
    assert!(matches!(missing, Err(DecodeError::Io(_))));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn cached_image_survives_file_removal_until_invalidated() {
    let dir = unique_temp_dir("cache");
    let path = dir.join("impos_test.ppm");
    std::fs::write(&path, ppm(2, 2, &[255u8, 0, 0].repeat(4))).expect("write red");

    let sampler = PixelSampler::default();
    let first = sampler.image(&path).expect("first decode");
    std::fs::remove_file(&path).expect("remove capture");

    let second = sampler.image(&path).expect("served from cache");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(sampler.pixel_at(&path, 1, 1), Some(Rgb::new(255, 0, 0)));

    std::fs::write(&path, ppm(2, 2, &[0u8, 0, 255].repeat(4))).expect("write blue");
    assert_eq!(sampler.pixel_at(&path, 1, 1), Some(Rgb::new(255, 0, 0)));

    assert!(sampler.invalidate(&path));
    assert_eq!(sampler.pixel_at(&path, 1, 1), Some(Rgb::new(0, 0, 255)));
    assert_eq!(sampler.pixel_at(&path, 2, 0), None);

    let _ = std::fs::remove_dir_all(dir);
}
