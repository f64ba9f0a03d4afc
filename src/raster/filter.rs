//! # 扫描线过滤模块
//!
//! ## 设计思路
//!
//! PNG 在压缩前对每一行做一次可逆预测变换，解码时必须逐字节精确还原。
//! 这里同时提供正向 `filter_scanline`（夹具与编码方使用）与反向 `unfilter_scanline`，
//! 两者互为左逆，可直接做性质测试。
//!
//! ## 实现思路
//!
//! - 第 `i` 个字节的邻居：`a` 为同行左侧第 `bpp` 个字节，`b` 为上一行同位置，
//!   `c` 为上一行左侧第 `bpp` 个字节；越过行首时取 0。
//! - 所有运算都是 `u8` 回绕（mod 256）。
//! - 第一行的“上一行”是全零行。

use super::DecodeError;

/// 每行首字节携带的过滤类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    None,
    Sub,
    Up,
    Average,
    Paeth,
}

impl FilterType {
    pub const ALL: [FilterType; 5] = [
        FilterType::None,
        FilterType::Sub,
        FilterType::Up,
        FilterType::Average,
        FilterType::Paeth,
    ];

    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Sub),
            2 => Some(Self::Up),
            3 => Some(Self::Average),
            4 => Some(Self::Paeth),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Sub => 1,
            Self::Up => 2,
            Self::Average => 3,
            Self::Paeth => 4,
        }
    }
}

/// Paeth 预测器：在左、上、左上三个邻居中选与 `a + b - c` 最接近者，平局依次偏向 a、b。
#[inline]
pub fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let (a_i, b_i, c_i) = (a as i16, b as i16, c as i16);
    let pa = (b_i - c_i).abs();
    let pb = (a_i - c_i).abs();
    let pc = (a_i + b_i - 2 * c_i).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[inline]
fn predict(filter: FilterType, a: u8, b: u8, c: u8) -> u8 {
    match filter {
        FilterType::None => 0,
        FilterType::Sub => a,
        FilterType::Up => b,
        FilterType::Average => ((a as u16 + b as u16) / 2) as u8,
        FilterType::Paeth => paeth_predictor(a, b, c),
    }
}

/// 原地还原一行。`prev` 必须是已还原的上一行（首行传全零）。
pub fn unfilter_scanline(filter: FilterType, row: &mut [u8], prev: &[u8], bpp: usize) {
    debug_assert_eq!(row.len(), prev.len());

    for i in 0..row.len() {
        let a = if i >= bpp { row[i - bpp] } else { 0 };
        let b = prev[i];
        let c = if i >= bpp { prev[i - bpp] } else { 0 };
        row[i] = row[i].wrapping_add(predict(filter, a, b, c));
    }
}

/// 对一行原始字节做正向过滤，返回过滤后的字节（不含类型前缀）。
///
/// 预测值总是取自未过滤的原始字节，因此 `unfilter_scanline` 是它的精确逆变换。
pub fn filter_scanline(filter: FilterType, row: &[u8], prev: &[u8], bpp: usize) -> Vec<u8> {
    debug_assert_eq!(row.len(), prev.len());

    (0..row.len())
        .map(|i| {
            let a = if i >= bpp { row[i - bpp] } else { 0 };
            let b = prev[i];
            let c = if i >= bpp { prev[i - bpp] } else { 0 };
            row[i].wrapping_sub(predict(filter, a, b, c))
        })
        .collect()
}

/// 还原 inflate 之后的整段扫描线数据。
///
/// `raw` 由 `height` 行组成，每行 `1 + row_bytes` 字节；多余的尾部字节会被忽略。
/// 返回去掉过滤类型前缀后、按行拼接的像素字节。
pub(crate) fn unfilter_rows(
    raw: &[u8],
    row_bytes: usize,
    height: usize,
    bpp: usize,
) -> Result<Vec<u8>, DecodeError> {
    let stride = row_bytes
        .checked_add(1)
        .ok_or_else(|| DecodeError::ResourceLimit("扫描线长度溢出".to_string()))?;
    let expected = stride
        .checked_mul(height)
        .ok_or_else(|| DecodeError::ResourceLimit("扫描线总长度溢出".to_string()))?;

    if raw.len() < expected {
        return Err(DecodeError::Truncated(format!(
            "解压后的扫描线数据不足：期望 {} 字节，实际 {} 字节",
            expected,
            raw.len()
        )));
    }

    let mut pixels = vec![0u8; row_bytes * height];
    let zero_row = vec![0u8; row_bytes];

    for (y, line) in raw[..expected].chunks_exact(stride).enumerate() {
        let filter = FilterType::from_byte(line[0])
            .ok_or(DecodeError::InvalidFilter { row: y, value: line[0] })?;

        let (done, rest) = pixels.split_at_mut(y * row_bytes);
        let row = &mut rest[..row_bytes];
        row.copy_from_slice(&line[1..]);

        let prev = if y == 0 {
            zero_row.as_slice()
        } else {
            &done[(y - 1) * row_bytes..]
        };
        unfilter_scanline(filter, row, prev, bpp);
    }

    Ok(pixels)
}
