//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 各子模块有自己的错误类型（`DecodeError`、`MonitorError`），命令行入口只面对
//! 一个 `AppError`，用 `?` 把下层错误直接向上传递。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为子模块错误提供 `From` 转换，无需手动 map。

use crate::raster::DecodeError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图像解码失败（格式 / 头部 / 压缩 / 截断）
    #[error("{0}")]
    Decode(#[from] DecodeError),

    /// 监视器连接或截图失败
    #[cfg(unix)]
    #[error("{0}")]
    Monitor(#[from] crate::harness::MonitorError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 参数或配置不合法
    #[error("配置错误: {0}")]
    Config(String),
}
