//! # 解码结果模型
//!
//! `Image` 是解码阶段唯一的输出：扁平字节缓冲 + 宽高 + 每像素字节数。
//! 构造时校验长度不变量，之后只读。

use std::fmt;

use super::DecodeError;

/// 已解码的 8 位像素图。
///
/// 不变量：`bytes.len() == width * height * bytes_per_pixel`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
    bytes: Vec<u8>,
}

impl Image {
    /// 用完整像素缓冲构造图像，长度不匹配时返回错误。
    pub fn new(
        width: u32,
        height: u32,
        bytes_per_pixel: usize,
        bytes: Vec<u8>,
    ) -> Result<Self, DecodeError> {
        if !matches!(bytes_per_pixel, 3 | 4) {
            return Err(DecodeError::Unsupported(format!(
                "每像素字节数只能是 3 或 4：{}",
                bytes_per_pixel
            )));
        }

        let expected_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(bytes_per_pixel))
            .ok_or_else(|| DecodeError::ResourceLimit("图片尺寸导致内存溢出风险".to_string()))?;

        if bytes.len() != expected_len {
            return Err(DecodeError::Truncated(format!(
                "像素缓冲长度异常：期望 {} 字节，实际 {} 字节",
                expected_len,
                bytes.len()
            )));
        }

        Ok(Self {
            width,
            height,
            bytes_per_pixel,
            bytes,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 3 表示 RGB，4 表示 RGBA。
    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn has_alpha(&self) -> bool {
        self.bytes_per_pixel == 4
    }
}

/// 一个像素的 RGB 三元组（alpha 不参与比较）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// 解析 `RRGGBB` / `#RRGGBB` 或 `r,g,b` 形式的颜色。
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if text.contains(',') {
            let mut parts = text.split(',').map(|part| part.trim().parse::<u8>());
            let r = parts.next()?.ok()?;
            let g = parts.next()?.ok()?;
            let b = parts.next()?.ok()?;
            if parts.next().is_some() {
                return None;
            }
            return Some(Self::new(r, g, b));
        }

        let hex = text.strip_prefix('#').unwrap_or(text);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.r, self.g, self.b)
    }
}
