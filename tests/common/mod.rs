#![allow(dead_code)]

use std::{cell::Cell, rc::Rc};

use embassy_debounced_button::{Button, ButtonConfig, Clock, Events, PullMode, Sampler};
use embassy_time::Instant;

// --- Mock Hardware (模拟硬件) ---

/// 手动推进的毫秒时钟。
#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub fn set(&self, ms: u64) {
        self.0.set(ms);
    }

    pub fn ms(&self) -> u64 {
        self.0.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.0.get())
    }
}

/// 测试可以随时改变电平的输入线。
#[derive(Clone)]
pub struct Line(Rc<Cell<bool>>);

impl Line {
    pub fn new(high: bool) -> Self {
        Self(Rc::new(Cell::new(high)))
    }

    pub fn set_high(&self, high: bool) {
        self.0.set(high);
    }
}

impl Sampler for Line {
    fn is_high(&mut self) -> bool {
        self.0.get()
    }
}

pub type TestButton<'h> = Button<'h, Line, ManualClock>;

// --- Test Harness (测试工具) ---

/// 一条上拉输入线（空闲高电平）加一个手动时钟。
pub struct Rig {
    pub line: Line,
    pub clock: ManualClock,
}

impl Rig {
    pub fn new() -> Self {
        Self {
            line: Line::new(true),
            clock: ManualClock::default(),
        }
    }

    pub fn button<'h>(&self, config: ButtonConfig) -> TestButton<'h> {
        self.button_with_mode(PullMode::PullUp, config)
    }

    pub fn button_with_mode<'h>(&self, mode: PullMode, config: ButtonConfig) -> TestButton<'h> {
        Button::new(2, self.line.clone(), self.clock.clone(), mode, config)
    }

    /// 在 `at` 毫秒时调用一次 `process()`。
    pub fn poll(&self, button: &mut TestButton<'_>, at: u64) -> Events {
        self.clock.set(at);
        button.process()
    }

    /// 从 `from` 到 `to`（含）每隔 `step` 毫秒调用一次 `process()`，
    /// 返回每次调用的时间和事件。
    pub fn sweep(
        &self,
        button: &mut TestButton<'_>,
        from: u64,
        to: u64,
        step: u64,
    ) -> Vec<(u64, Events)> {
        (from..=to)
            .step_by(step as usize)
            .map(|t| (t, self.poll(button, t)))
            .collect()
    }

    /// 按下（拉低）并在 `press_ms` 处调用，然后释放并在 `release_ms` 处调用。
    /// 仅适用于关闭消抖的按钮。
    pub fn tap(&self, button: &mut TestButton<'_>, press_ms: u64, release_ms: u64) -> Events {
        self.line.set_high(false);
        self.poll(button, press_ms);
        self.line.set_high(true);
        self.poll(button, release_ms)
    }
}

/// 关闭消抖、便于精确控制时间的配置。
pub fn instant_config() -> ButtonConfig {
    ButtonConfig::default().without_debounce()
}
