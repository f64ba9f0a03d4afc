//! # PPM（二进制 P6）解析
//!
//! ## 实现思路
//!
//! 1. 头部按 token 读取：跳过空白（空格/制表/换行/回车），
//!    token 起始处遇到 `#` 则吞掉整行注释后继续。
//! 2. 依次读取 `magic width height maxval`，`maxval` 后恰好一个空白字节。
//! 3. `maxval < 256` 时每通道 1 字节，直接拷贝；否则每通道 2 字节（大端），只取高字节。
//! 4. 样本数据不足时返回 `Truncated`，多余的尾部字节忽略。

use super::{DecodeError, DecoderConfig, Image};

const PPM_MAGIC: &[u8] = b"P6";

#[inline]
fn is_header_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

/// 头部 token 读取器，游标停在最后一个 token 之后。
struct HeaderTokens<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> HeaderTokens<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    fn next_token(&mut self) -> Option<&'a [u8]> {
        loop {
            while self.cursor < self.data.len() && is_header_space(self.data[self.cursor]) {
                self.cursor += 1;
            }
            if self.cursor < self.data.len() && self.data[self.cursor] == b'#' {
                while self.cursor < self.data.len() && self.data[self.cursor] != b'\n' {
                    self.cursor += 1;
                }
                continue;
            }
            break;
        }

        if self.cursor >= self.data.len() {
            return None;
        }

        let start = self.cursor;
        while self.cursor < self.data.len() && !is_header_space(self.data[self.cursor]) {
            self.cursor += 1;
        }
        Some(&self.data[start..self.cursor])
    }

    fn next_number(&mut self, field: &str) -> Result<u32, DecodeError> {
        let token = self
            .next_token()
            .ok_or_else(|| DecodeError::MalformedHeader(format!("缺少字段 {}", field)))?;

        std::str::from_utf8(token)
            .ok()
            .filter(|text| text.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|text| text.parse::<u32>().ok())
            .ok_or_else(|| {
                DecodeError::MalformedHeader(format!(
                    "字段 {} 不是合法数字：{:?}",
                    field,
                    String::from_utf8_lossy(token)
                ))
            })
    }
}

/// PPM 头部字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpmHeader {
    pub width: u32,
    pub height: u32,
    pub maxval: u32,
    /// 像素数据在文件中的起始偏移。
    pub data_offset: usize,
}

impl PpmHeader {
    /// 每个通道样本占用的字节数。
    pub fn sample_bytes(&self) -> usize {
        if self.maxval < 256 { 1 } else { 2 }
    }
}

/// 只解析头部，不触碰像素数据。
pub fn parse_header(data: &[u8]) -> Result<PpmHeader, DecodeError> {
    let mut tokens = HeaderTokens::new(data);

    let magic = tokens
        .next_token()
        .ok_or_else(|| DecodeError::MalformedHeader("PPM 头部为空".to_string()))?;
    if magic != PPM_MAGIC {
        return Err(DecodeError::MalformedHeader(format!(
            "PPM 魔数应为 P6，实际为 {:?}",
            String::from_utf8_lossy(magic)
        )));
    }

    let width = tokens.next_number("width")?;
    let height = tokens.next_number("height")?;
    let maxval = tokens.next_number("maxval")?;

    if width == 0 || height == 0 {
        return Err(DecodeError::MalformedHeader(format!(
            "宽高必须为正数：{}x{}",
            width, height
        )));
    }
    if maxval == 0 || maxval > u16::MAX as u32 {
        return Err(DecodeError::MalformedHeader(format!(
            "maxval 超出范围 1..=65535：{}",
            maxval
        )));
    }

    if tokens.cursor >= data.len() {
        return Err(DecodeError::Truncated("maxval 之后缺少分隔字节".to_string()));
    }

    Ok(PpmHeader {
        width,
        height,
        maxval,
        data_offset: tokens.cursor + 1,
    })
}

/// 将二进制 PPM 解码为 3 字节/像素的 `Image`。
pub fn decode(data: &[u8], config: &DecoderConfig) -> Result<Image, DecodeError> {
    let header = parse_header(data)?;
    let out_len = config.check_dimensions(header.width, header.height, 3)?;

    let sample_bytes = header.sample_bytes();
    let needed = out_len
        .checked_mul(sample_bytes)
        .ok_or_else(|| DecodeError::ResourceLimit("PPM 样本长度溢出".to_string()))?;
    let raw = &data[header.data_offset..];

    if raw.len() < needed {
        return Err(DecodeError::Truncated(format!(
            "PPM 像素数据不足：期望 {} 字节，实际 {} 字节",
            needed,
            raw.len()
        )));
    }

    let pixels = if sample_bytes == 1 {
        raw[..needed].to_vec()
    } else {
        // 16 位大端样本，取高字节
        raw[..needed].chunks_exact(2).map(|sample| sample[0]).collect()
    };

    log::debug!(
        "PPM 头部：{}x{} maxval={} 样本字节={}",
        header.width,
        header.height,
        header.maxval,
        sample_bytes
    );

    Image::new(header.width, header.height, 3, pixels)
}
