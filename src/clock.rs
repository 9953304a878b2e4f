use embassy_time::Instant;

/// 单调递增的毫秒时间源。
///
/// `Button` 在每次 `process()` 以及时长查询时读取一次当前时间。
pub trait Clock {
    fn now(&self) -> Instant;
}

/// 基于 embassy 时间驱动的时钟。
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }
}
