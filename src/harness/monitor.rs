//! # QEMU 监视器客户端
//!
//! ## 设计思路
//!
//! QEMU human monitor 是按行交互的文本协议：写入一行命令，等待片刻，再把输出读干净。
//! 客户端只负责发命令与等待，不解析输出；截图是否就绪以文件落盘为准。
//!
//! 截图命令把缓存失效绑定在流程里，保证顺序永远是：
//!
//! ```text
//! screendump P → 等待 P 出现 → sampler.invalidate(P) → 调用方查询像素
//! ```
//!
//! ## 实现思路
//!
//! - `tokio::net::UnixStream` + `try_read` 非阻塞排空输出，避免把上一条命令的回显留给下一条。
//! - 截图前删除旧文件，再轮询直到新文件出现且长度稳定或超时，避免读到上一轮截图或写了一半的文件。
//! - 鼠标位移同步更新 `CursorTracker`，`move_to/click_at` 基于它换算相对位移。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::time::sleep;

use super::{CursorTracker, HarnessConfig};
use crate::sampler::PixelSampler;

const DRAIN_BUFFER_BYTES: usize = 4096;
const CAPTURE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 监视器通信错误。
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("连接监视器失败 {path}: {source}")]
    Connect {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("监视器通信错误：{0}")]
    Io(#[from] std::io::Error),

    #[error("等待截图超时（{timeout_ms}ms）：{path}")]
    CaptureTimeout { path: String, timeout_ms: u64 },
}

/// `mouse_button` 的按键掩码。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    pub fn mask(self) -> u8 {
        match self {
            Self::Left => 1,
            Self::Middle => 2,
            Self::Right => 4,
        }
    }
}

/// 等待 `path` 出现且长度在相邻两次轮询间不再变化。
///
/// QEMU 的 HMP `screendump` 在命令返回前同步写完文件；长度稳定的判断
/// 用于覆盖边轮询边原地写入的监视器实现。
async fn wait_for_stable_file(path: &Path, timeout: Duration) -> Result<(), MonitorError> {
    let deadline = Instant::now() + timeout;
    let mut last_len = None;

    loop {
        if let Ok(meta) = tokio::fs::metadata(path).await {
            let len = meta.len();
            if meta.is_file() && len > 0 && last_len == Some(len) {
                return Ok(());
            }
            last_len = Some(len);
        }
        if Instant::now() >= deadline {
            return Err(MonitorError::CaptureTimeout {
                path: path.display().to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        sleep(CAPTURE_POLL_INTERVAL).await;
    }
}

/// 已连接的监视器会话。
pub struct QemuMonitor {
    stream: UnixStream,
    config: HarnessConfig,
    cursor: CursorTracker,
}

impl QemuMonitor {
    /// 连接 `config.socket_path` 并丢弃欢迎信息。
    pub async fn connect(config: HarnessConfig) -> Result<Self, MonitorError> {
        let stream = UnixStream::connect(&config.socket_path)
            .await
            .map_err(|source| MonitorError::Connect {
                path: config.socket_path.display().to_string(),
                source,
            })?;

        let cursor = CursorTracker::centered(config.screen_width, config.screen_height);
        let mut monitor = Self {
            stream,
            config,
            cursor,
        };

        sleep(Duration::from_millis(monitor.config.connect_settle_ms)).await;
        let banner = monitor.drain()?;
        log::info!(
            "🔌 已连接 QEMU 监视器 - {} ({} 字节欢迎信息)",
            monitor.config.socket_path.display(),
            banner.len()
        );

        Ok(monitor)
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn cursor(&self) -> &CursorTracker {
        &self.cursor
    }

    /// 非阻塞读干净当前可读的输出。
    fn drain(&mut self) -> Result<String, MonitorError> {
        let mut collected = Vec::new();
        let mut buf = [0u8; DRAIN_BUFFER_BYTES];

        loop {
            match self.stream.try_read(&mut buf) {
                Ok(0) => break,
                Ok(n) => collected.extend_from_slice(&buf[..n]),
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(String::from_utf8_lossy(&collected).into_owned())
    }

    /// 发送一行命令，等待 `wait` 后返回期间收到的输出。
    pub async fn command(&mut self, command: &str, wait: Duration) -> Result<String, MonitorError> {
        log::debug!("monitor <- {}", command);
        self.stream.write_all(format!("{command}\n").as_bytes()).await?;
        sleep(wait).await;
        self.drain()
    }

    /// 以配置中的默认等待时长发送命令。
    pub async fn run(&mut self, command: &str) -> Result<String, MonitorError> {
        let wait = self.config.command_wait();
        self.command(command, wait).await
    }

    /// 截图到 `path`，文件落盘后使其缓存失效。
    pub async fn screendump(
        &mut self,
        path: &Path,
        sampler: &PixelSampler,
    ) -> Result<(), MonitorError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        let started = Instant::now();
        let wait = self.config.screendump_wait();
        self.command(&format!("screendump {}", path.display()), wait)
            .await?;
        wait_for_stable_file(path, self.config.capture_timeout()).await?;
        sampler.invalidate(path);

        log::info!(
            "📸 截图完成 - {} 耗时: {}ms",
            path.display(),
            started.elapsed().as_millis()
        );
        Ok(())
    }

    /// 截图到配置中的默认路径。
    pub async fn screenshot(&mut self, sampler: &PixelSampler) -> Result<PathBuf, MonitorError> {
        let path = self.config.screenshot_path.clone();
        self.screendump(&path, sampler).await?;
        Ok(path)
    }

    /// 把当前截图另存为 `<archive_dir>/impos_test_<label>.<ext>`，并使目标路径缓存失效。
    pub async fn archive_capture(
        &self,
        label: &str,
        sampler: &PixelSampler,
    ) -> Result<PathBuf, MonitorError> {
        let source = &self.config.screenshot_path;
        let ext = source
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("png");
        let dest = self
            .config
            .archive_dir
            .join(format!("impos_test_{label}.{ext}"));

        tokio::fs::copy(source, &dest).await?;
        sampler.invalidate(&dest);

        log::info!("截图已存档: {}", dest.display());
        Ok(dest)
    }

    pub async fn send_key(&mut self, key: &str) -> Result<(), MonitorError> {
        let wait = self.config.anim_delay();
        self.command(&format!("sendkey {key}"), wait).await?;
        Ok(())
    }

    /// 相对移动光标，并同步记录位置。
    pub async fn mouse_move(&mut self, dx: i32, dy: i32) -> Result<(), MonitorError> {
        let wait = self.config.short_delay();
        self.command(&format!("mouse_move {dx} {dy}"), wait).await?;
        self.cursor.apply(dx, dy);
        Ok(())
    }

    /// 按下并抬起按键，抬起后等待 `wait`。
    pub async fn mouse_click(
        &mut self,
        button: MouseButton,
        wait: Duration,
    ) -> Result<(), MonitorError> {
        let release_wait = Duration::from_millis(self.config.click_release_wait_ms);
        self.command(&format!("mouse_button {}", button.mask()), release_wait)
            .await?;
        self.command("mouse_button 0", wait).await?;
        Ok(())
    }

    /// 把光标移动到屏幕绝对坐标。
    pub async fn move_to(&mut self, x: i32, y: i32) -> Result<(), MonitorError> {
        match self.cursor.delta_to(x, y) {
            Some((dx, dy)) => self.mouse_move(dx, dy).await,
            None => Ok(()),
        }
    }

    /// 移动到 `(x, y)` 后点击，并等待动画稳定。
    pub async fn click_at(
        &mut self,
        x: i32,
        y: i32,
        button: MouseButton,
    ) -> Result<(), MonitorError> {
        self.move_to(x, y).await?;
        sleep(self.config.short_delay()).await;
        let wait = self.config.anim_delay();
        self.mouse_click(button, wait).await
    }
}
