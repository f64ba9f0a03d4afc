//! 像素查询原语：坐标取色与带容差的颜色比较，所有断言都建立在这两个函数之上。

use crate::raster::{Image, Rgb};

/// 读取 `(x, y)` 处像素的前三个通道；越界返回 `None`。
///
/// RGBA 图像的 alpha 字节会被跳过。
pub fn pixel_at(image: &Image, x: u32, y: u32) -> Option<Rgb> {
    if x >= image.width() || y >= image.height() {
        return None;
    }

    let offset = (y as usize * image.width() as usize + x as usize) * image.bytes_per_pixel();
    let px = image.as_bytes().get(offset..offset + 3)?;
    Some(Rgb::new(px[0], px[1], px[2]))
}

/// 每个通道的绝对差都不超过 `tolerance` 时返回 `true`；`actual` 缺失时恒为 `false`。
pub fn approximately_equals(actual: Option<Rgb>, expected: Rgb, tolerance: u8) -> bool {
    let Some(actual) = actual else {
        return false;
    };

    actual.r.abs_diff(expected.r) <= tolerance
        && actual.g.abs_diff(expected.g) <= tolerance
        && actual.b.abs_diff(expected.b) <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_2x2() -> Image {
        Image::new(2, 2, 3, [255u8, 0, 0].repeat(4)).unwrap()
    }

    #[test]
    fn pixel_at_reads_leading_channels_and_bounds() {
        let image = red_2x2();

        assert_eq!(pixel_at(&image, 0, 0), Some(Rgb::new(255, 0, 0)));
        assert_eq!(pixel_at(&image, 1, 1), Some(Rgb::new(255, 0, 0)));
        assert_eq!(pixel_at(&image, 2, 0), None);
        assert_eq!(pixel_at(&image, 0, 2), None);
        assert_eq!(pixel_at(&image, u32::MAX, u32::MAX), None);
    }

    #[test]
    fn pixel_at_uses_row_major_offsets() {
        let bytes: Vec<u8> = (0..24).collect();
        let image = Image::new(3, 2, 4, bytes).unwrap();

        // (1, 1) → 像素序号 4 → 偏移 16，alpha(19) 被忽略
        assert_eq!(pixel_at(&image, 1, 1), Some(Rgb::new(16, 17, 18)));
        assert_eq!(pixel_at(&image, 2, 0), Some(Rgb::new(8, 9, 10)));
    }

    #[test]
    fn approximately_equals_checks_each_channel() {
        let actual = Some(Rgb::new(12, 16, 22));

        assert!(approximately_equals(actual, Rgb::new(10, 14, 20), 25));
        assert!(!approximately_equals(actual, Rgb::new(200, 16, 22), 25));
        assert!(approximately_equals(actual, Rgb::new(12, 16, 22), 0));
        assert!(!approximately_equals(actual, Rgb::new(12, 16, 23), 0));
        assert!(!approximately_equals(None, Rgb::new(0, 0, 0), 255));
        assert!(approximately_equals(Some(Rgb::new(0, 0, 0)), Rgb::new(255, 255, 255), 255));
    }
}
