//! # 测试驱动配置
//!
//! ## 设计思路
//!
//! 监视器 socket 路径、截图路径、屏幕尺寸与各种等待时长集中在 `HarnessConfig`，
//! 默认值与 QEMU 1024x768 桌面测试场景一致。
//!
//! ## 实现思路
//!
//! - JSON 文件中缺失的字段用默认值补齐（`#[serde(default)]`）。
//! - 文件不存在或无法解析时回退为默认配置并记录 `warn`，不阻塞测试启动。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::raster::DecoderConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// QEMU human monitor 的 Unix socket。
    pub socket_path: PathBuf,
    /// `screendump` 的目标路径。
    pub screenshot_path: PathBuf,
    /// `archive_capture` 的存档目录。
    pub archive_dir: PathBuf,
    pub screen_width: u32,
    pub screen_height: u32,
    /// 普通命令发送后的等待时间（毫秒）。
    pub command_wait_ms: u64,
    /// `screendump` 发送后的等待时间（毫秒）。
    pub screendump_wait_ms: u64,
    /// 等待截图文件出现的上限（毫秒）。
    pub capture_timeout_ms: u64,
    /// 按键/点击后等待界面动画稳定的时间（毫秒）。
    pub anim_delay_ms: u64,
    /// 鼠标移动之间的间隔（毫秒）。
    pub short_delay_ms: u64,
    /// 鼠标按下到抬起之间的等待（毫秒）。
    pub click_release_wait_ms: u64,
    /// 连接 socket 后等待 banner 输出的时间（毫秒）。
    pub connect_settle_ms: u64,
    /// 像素比较的默认容差。
    pub default_tolerance: u8,
    pub decoder: DecoderConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from("/tmp/impos_qemu.sock"),
            screenshot_path: PathBuf::from("/tmp/impos_test.png"),
            archive_dir: PathBuf::from("/tmp"),
            screen_width: 1024,
            screen_height: 768,
            command_wait_ms: 200,
            screendump_wait_ms: 600,
            capture_timeout_ms: 5_000,
            anim_delay_ms: 1_200,
            short_delay_ms: 400,
            click_release_wait_ms: 100,
            connect_settle_ms: 200,
            default_tolerance: 30,
            decoder: DecoderConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// 从 JSON 文件加载配置，失败时回退默认值。
    pub fn load_from_path(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("读取配置文件失败，使用默认配置: {} ({})", path.display(), err);
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("解析配置文件失败，使用默认配置: {} ({})", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn command_wait(&self) -> Duration {
        Duration::from_millis(self.command_wait_ms)
    }

    pub fn screendump_wait(&self) -> Duration {
        Duration::from_millis(self.screendump_wait_ms)
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }

    pub fn anim_delay(&self) -> Duration {
        Duration::from_millis(self.anim_delay_ms)
    }

    pub fn short_delay(&self) -> Duration {
        Duration::from_millis(self.short_delay_ms)
    }
}
