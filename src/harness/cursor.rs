//! # 虚拟光标跟踪
//!
//! QEMU 的 `mouse_move` 只接受相对位移，这里记录光标的绝对位置，
//! 把“移动到 (x, y)”换算成位移，并按屏幕边界钳制（与客户机行为一致）。

/// 客户机屏幕上的光标位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorTracker {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl CursorTracker {
    /// 光标初始位于屏幕中心。
    pub fn centered(width: u32, height: u32) -> Self {
        let width = width.max(1) as i32;
        let height = height.max(1) as i32;
        Self {
            x: width / 2,
            y: height / 2,
            width,
            height,
        }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// 到目标点的相对位移；已在目标点时返回 `None`。
    pub fn delta_to(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        let (dx, dy) = (x - self.x, y - self.y);
        if dx == 0 && dy == 0 {
            None
        } else {
            Some((dx, dy))
        }
    }

    /// 记录一次位移，结果钳制在 `[0, width-1] × [0, height-1]`。
    pub fn apply(&mut self, dx: i32, dy: i32) {
        self.x = self.x.saturating_add(dx).clamp(0, self.width - 1);
        self.y = self.y.saturating_add(dy).clamp(0, self.height - 1);
    }

    /// 重置回屏幕中心（例如客户机重启后）。
    pub fn recenter(&mut self) {
        self.x = self.width / 2;
        self.y = self.height / 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_screen_center() {
        let cursor = CursorTracker::centered(1024, 768);
        assert_eq!(cursor.position(), (512, 384));
    }

    #[test]
    fn delta_to_is_relative_and_none_when_already_there() {
        let cursor = CursorTracker::centered(1024, 768);

        assert_eq!(cursor.delta_to(600, 300), Some((88, -84)));
        assert_eq!(cursor.delta_to(512, 384), None);
    }

    #[test]
    fn apply_clamps_to_screen_edges() {
        let mut cursor = CursorTracker::centered(1024, 768);

        cursor.apply(-2000, 2000);
        assert_eq!(cursor.position(), (0, 767));

        cursor.apply(5000, -5000);
        assert_eq!(cursor.position(), (1023, 0));

        cursor.recenter();
        assert_eq!(cursor.position(), (512, 384));
    }
}
