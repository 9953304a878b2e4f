use embedded_hal::digital::InputPin;

/// 读取一条数字输入线的电平。
///
/// 每次 `Button::process()` 只调用一次。返回 `true` 表示高电平。
/// 闭包 `FnMut() -> bool` 也可直接作为采样源使用。
pub trait Sampler {
    fn is_high(&mut self) -> bool;
}

impl<F> Sampler for F
where
    F: FnMut() -> bool,
{
    fn is_high(&mut self) -> bool {
        self()
    }
}

/// 一个直接由GPIO输入引脚驱动的采样源。
///
/// 引脚的上拉/下拉配置由调用者在构造引脚时完成，
/// 这里只负责读取电平。读取失败时沿用上一次的采样值。
pub struct GpioSampler<P: InputPin> {
    pin: P,
    last: bool,
}

impl<P: InputPin> GpioSampler<P> {
    /// 创建一个新的GPIO采样源。
    ///
    /// # 参数
    /// * `pin`: 一个实现了 `InputPin` 的GPIO引脚。
    /// * `idle_high`: 在第一次成功读取之前假定的电平，通常为按钮空闲时的电平。
    pub fn new(pin: P, idle_high: bool) -> Self {
        Self {
            pin,
            last: idle_high,
        }
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: InputPin> Sampler for GpioSampler<P> {
    fn is_high(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(level) => self.last = level,
            Err(_) => warn!("pin read failed, repeating last sample {}", self.last),
        }
        self.last
    }
}
