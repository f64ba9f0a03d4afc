//! # 解码错误模型
//!
//! ## 设计思路
//!
//! 用单一枚举承载解码链路中的所有失败来源，调用侧可按分支匹配，
//! 查询层再统一降级为“像素不可用”。
//!
//! 所有越界读取都在这里有名字（`Truncated`），不会出现 panic。

/// 图片解码统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// 魔数既不是 PPM 也不是 PNG。
    #[error("无法识别的图片格式：{0}")]
    UnrecognizedFormat(String),

    /// 头部字段缺失、非数字或取值非法。
    #[error("头部格式错误：{0}")]
    MalformedHeader(String),

    /// 合法但不在支持范围内的输入（隔行扫描、索引色、非 8/16 位深等）。
    #[error("不支持的图片特性：{0}")]
    Unsupported(String),

    #[error("第 {row} 行扫描线的过滤类型非法：{value}")]
    InvalidFilter { row: usize, value: u8 },

    /// 压缩流被 inflate 拒绝。
    #[error("压缩数据解压失败：{0}")]
    Compression(String),

    #[error("数据被截断：{0}")]
    Truncated(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("读取文件失败：{0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// 稳定的错误码，供日志与报告使用。
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnrecognizedFormat(_) => "unrecognized_format",
            Self::MalformedHeader(_) => "malformed_header",
            Self::Unsupported(_) => "unsupported",
            Self::InvalidFilter { .. } => "invalid_filter",
            Self::Compression(_) => "compression_failure",
            Self::Truncated(_) => "truncated",
            Self::ResourceLimit(_) => "resource_limit",
            Self::Io(_) => "io",
        }
    }
}
