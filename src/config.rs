use embassy_time::Duration;

/// 定义按钮事件逻辑的通用配置参数。
///
/// 这个结构体允许用户精细调整各种时间相关的行为，
/// 例如消抖、双击间隔和长按检测时间。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    /// 消抖持续时间，`None` 表示关闭消抖。
    ///
    /// 采样电平与当前状态不同后，必须保持至少这么久才会被接受。
    /// 期间电平回到原状态则计时作废，视为抖动。
    /// 时长为零时等同于关闭消抖。
    pub debounce: Option<Duration>,

    /// 触发长按事件所需的持续时间。
    ///
    /// 按下时长达到该阈值时触发一次 `Hold`；
    /// 只有严格小于该阈值的按下才会被视为单击。
    pub hold_threshold: Duration,

    /// 双击的时间窗口。
    ///
    /// 以两次按下的起始时间之差计算。
    pub double_click_threshold: Duration,
}

impl ButtonConfig {
    pub const fn new() -> Self {
        Self {
            debounce: Some(Duration::from_millis(20)),
            hold_threshold: Duration::from_millis(500),
            double_click_threshold: Duration::from_millis(900),
        }
    }

    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = Some(debounce);
        self
    }

    pub const fn without_debounce(mut self) -> Self {
        self.debounce = None;
        self
    }

    pub const fn with_hold_threshold(mut self, threshold: Duration) -> Self {
        self.hold_threshold = threshold;
        self
    }

    pub const fn with_double_click_threshold(mut self, threshold: Duration) -> Self {
        self.double_click_threshold = threshold;
        self
    }

    /// 实际生效的消抖时长；关闭或为零时返回 `None`。
    pub(crate) fn effective_debounce(&self) -> Option<Duration> {
        self.debounce.filter(|d| d.as_ticks() > 0)
    }
}

impl Default for ButtonConfig {
    /// 提供一套合理的默认配置。
    ///
    /// - 消抖: 20ms
    /// - 长按阈值: 500ms
    /// - 双击窗口: 900ms
    fn default() -> Self {
        Self::new()
    }
}
