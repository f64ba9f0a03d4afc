//! # PNG 解析
//!
//! ## 设计思路
//!
//! 只覆盖截图场景需要的子集：8/16 位深的真彩色（可带 alpha）、非隔行。
//! 其余合法 PNG 特性一律以具名错误拒绝，而不是静默错解。
//!
//! ## 实现思路
//!
//! 1. 从第 8 字节开始顺序遍历 chunk：`length(u32 BE) | type(4) | data | crc(4)`，CRC 不校验。
//! 2. `IHDR` 取宽高、位深、颜色类型等；`IDAT` 按出现顺序累积；遇到 `IEND` 立即停止。
//! 3. 拼接所有 IDAT 交给 zlib inflate（`flate2`）。
//! 4. 按颜色类型确定通道数，逐行反过滤。
//! 5. 16 位样本只保留高字节，输出统一为 8 位缓冲。

use std::io::Read;

use flate2::read::ZlibDecoder;

use super::filter::unfilter_rows;
use super::{ColorTypePolicy, DecodeError, DecoderConfig, Image};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

const IHDR_MIN_LEN: usize = 13;

/// 遍历过程中的单个 chunk，只借用输入缓冲。
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    pub kind: [u8; 4],
    pub data: &'a [u8],
}

/// chunk 顺序迭代器；越界时产出 `Truncated` 后结束。
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> ChunkReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: PNG_SIGNATURE.len(),
            failed: false,
        }
    }

    fn read_next(&mut self) -> Result<Chunk<'a>, DecodeError> {
        let header = self
            .data
            .get(self.pos..self.pos + 8)
            .ok_or_else(|| DecodeError::Truncated(format!("偏移 {} 处的 chunk 头不完整", self.pos)))?;

        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let kind = [header[4], header[5], header[6], header[7]];

        let data_start = self.pos + 8;
        let data_end = data_start
            .checked_add(length)
            .ok_or_else(|| DecodeError::Truncated("chunk 长度溢出".to_string()))?;
        let crc_end = data_end
            .checked_add(4)
            .ok_or_else(|| DecodeError::Truncated("chunk 长度溢出".to_string()))?;

        if crc_end > self.data.len() {
            return Err(DecodeError::Truncated(format!(
                "chunk {} 声明 {} 字节，剩余数据不足",
                String::from_utf8_lossy(&kind),
                length
            )));
        }

        self.pos = crc_end;
        Ok(Chunk {
            kind,
            data: &self.data[data_start..data_end],
        })
    }
}

impl<'a> Iterator for ChunkReader<'a> {
    type Item = Result<Chunk<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }

        let result = self.read_next();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// IHDR 中解码需要的字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
    pub interlace: u8,
}

impl PngHeader {
    fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < IHDR_MIN_LEN {
            return Err(DecodeError::MalformedHeader(format!(
                "IHDR 长度不足：{} 字节",
                data.len()
            )));
        }

        let header = Self {
            width: u32::from_be_bytes([data[0], data[1], data[2], data[3]]),
            height: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            bit_depth: data[8],
            color_type: data[9],
            interlace: data[12],
        };

        if data[10] != 0 || data[11] != 0 {
            return Err(DecodeError::Unsupported(format!(
                "未知压缩/过滤方法：{}/{}",
                data[10], data[11]
            )));
        }

        Ok(header)
    }

    /// 颜色类型到通道数的固定映射。
    ///
    /// 只识别 2 与 6；索引色一律拒绝；其余按策略兜底为 3 或报错。
    pub fn channels(&self, policy: ColorTypePolicy) -> Result<usize, DecodeError> {
        match (self.color_type, policy) {
            (2, _) => Ok(3),
            (6, _) => Ok(4),
            (3, _) => Err(DecodeError::Unsupported("不支持索引色（调色板）PNG".to_string())),
            (other, ColorTypePolicy::Permissive) => {
                log::warn!("⚠️ 未识别的 PNG 颜色类型 {}，按 3 字节/像素处理", other);
                Ok(3)
            }
            (other, ColorTypePolicy::Strict) => Err(DecodeError::Unsupported(format!(
                "不支持的 PNG 颜色类型：{}",
                other
            ))),
        }
    }
}

/// 按顺序收集 IHDR 与所有 IDAT 片段。
fn collect_chunks(data: &[u8]) -> Result<(PngHeader, Vec<&[u8]>), DecodeError> {
    let mut header = None;
    let mut idat = Vec::new();

    for chunk in ChunkReader::new(data) {
        let chunk = chunk?;
        log::debug!(
            "PNG chunk {} ({} 字节)",
            String::from_utf8_lossy(&chunk.kind),
            chunk.data.len()
        );

        match &chunk.kind {
            b"IHDR" => header = Some(PngHeader::parse(chunk.data)?),
            b"IDAT" => idat.push(chunk.data),
            b"IEND" => break,
            _ => {}
        }
    }

    let header = header.ok_or_else(|| DecodeError::MalformedHeader("缺少 IHDR".to_string()))?;
    Ok((header, idat))
}

/// 过滤后扫描线流的长度：每行 1 字节过滤类型 + `row_bytes` 字节数据。
fn scanline_stream_len(row_bytes: usize, height: u32) -> Result<usize, DecodeError> {
    row_bytes
        .checked_add(1)
        .and_then(|row| row.checked_mul(height as usize))
        .ok_or_else(|| DecodeError::ResourceLimit("扫描线数据长度溢出".to_string()))
}

/// 调用 zlib inflate，输出最多 `limit` 字节，失败统一映射为 `Compression`。
///
/// 超出 `limit` 的解压数据不会被读出，与“尾部多余字节忽略”一致。
fn inflate(fragments: &[&[u8]], limit: usize) -> Result<Vec<u8>, DecodeError> {
    let compressed = fragments.concat();
    if compressed.is_empty() {
        return Err(DecodeError::Compression("缺少 IDAT 数据".to_string()));
    }

    let mut out = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .take(limit as u64)
        .read_to_end(&mut out)
        .map_err(|e| DecodeError::Compression(e.to_string()))?;
    Ok(out)
}

/// 将 PNG 字节流解码为 `Image`（RGB 或 RGBA）。
pub fn decode(data: &[u8], config: &DecoderConfig) -> Result<Image, DecodeError> {
    if !data.starts_with(&PNG_SIGNATURE) {
        return Err(DecodeError::UnrecognizedFormat("缺少 PNG 签名".to_string()));
    }

    let (header, idat) = collect_chunks(data)?;

    if header.interlace != 0 {
        return Err(DecodeError::Unsupported("不支持隔行扫描（Adam7）PNG".to_string()));
    }
    let sample_bytes = match header.bit_depth {
        8 => 1,
        16 => 2,
        other => {
            return Err(DecodeError::Unsupported(format!("不支持的位深：{}", other)));
        }
    };

    let channels = header.channels(config.color_type_policy)?;
    let bpp = channels * sample_bytes;
    // 16 位时反过滤缓冲是输出的两倍，按它计入字节上限
    config.check_dimensions(header.width, header.height, bpp)?;
    let out_len = header.width as usize * header.height as usize * channels;

    let row_bytes = header.width as usize * bpp;
    let raw = inflate(&idat, scanline_stream_len(row_bytes, header.height)?)?;

    let unfiltered = unfilter_rows(&raw, row_bytes, header.height as usize, bpp)?;

    let pixels = if sample_bytes == 1 {
        unfiltered
    } else {
        unfiltered.chunks_exact(2).map(|sample| sample[0]).collect()
    };
    debug_assert_eq!(pixels.len(), out_len);

    log::debug!(
        "PNG：{}x{} 位深={} 颜色类型={} IDAT 片段={} 解压后={} 字节",
        header.width,
        header.height,
        header.bit_depth,
        header.color_type,
        idat.len(),
        raw.len()
    );

    Image::new(header.width, header.height, channels, pixels)
}
