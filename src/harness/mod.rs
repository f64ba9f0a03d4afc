//! # 测试驱动模块（harness）
//!
//! ## 设计思路
//!
//! 解码与采样之外，GUI 测试还需要：向 QEMU 监视器发命令、跟踪虚拟光标、汇总检查结果。
//! 这些都是薄封装，像素判断一律委托给 `sampler`。
//!
//! - `config`：socket/截图路径、屏幕尺寸、各种等待时长
//! - `monitor`：按行交互的监视器客户端（截图、按键、鼠标）
//! - `cursor`：相对位移 ↔ 绝对坐标换算
//! - `report`：PASS/FAIL 记录与汇总

mod config;
mod cursor;
#[cfg(unix)]
mod monitor;
mod report;

pub use config::HarnessConfig;
pub use cursor::CursorTracker;
#[cfg(unix)]
pub use monitor::{MonitorError, MouseButton, QemuMonitor};
pub use report::{CheckOutcome, CheckReport};
