#![no_std]

#[macro_use]
mod fmt;

pub mod clock;
pub mod config;
pub mod gpio;

pub use clock::{Clock, EmbassyClock};
pub use config::*;
pub use gpio::{GpioSampler, Sampler};

use embassy_time::{Duration, Instant, Ticker};

/// 决定哪一种采样电平表示“按下”。
///
/// 只影响电平的解释方式，引脚本身的上拉/下拉配置不由本库负责。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullMode {
    /// 外部上拉：空闲为高电平，按下为低电平。
    PullUp,
    /// 内部上拉：电平约定与 `PullUp` 相同。
    PullUpInternal,
    /// 下拉：空闲为低电平，按下为高电平。
    PullDown,
}

impl PullMode {
    /// 空闲（释放）时的电平。
    pub fn idle_high(self) -> bool {
        match self {
            PullMode::PullUp | PullMode::PullUpInternal => true,
            PullMode::PullDown => false,
        }
    }

    fn is_pressed(self, high: bool) -> bool {
        high != self.idle_high()
    }
}

/// 经过消抖后的逻辑状态。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Released,
    Pressed,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Press,
    Release,
    Click,
    DoubleClick,
    Hold,
}

/// 单次 `process()` 调用中识别出的事件。
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Events {
    /// 接受了一次状态变化（按下或释放）。
    pub state_changed: bool,
    /// 释放到按下。
    pub press: bool,
    /// 按下到释放。
    pub release: bool,
    /// 短于长按阈值且不属于双击的一次完整按下。
    pub click: bool,
    pub double_click: bool,
    /// 按下时长达到长按阈值，每次按下最多一次。
    pub hold: bool,
}

impl Events {
    /// 是否识别出任何事件。
    pub fn any(&self) -> bool {
        self.state_changed || self.hold
    }

    pub fn contains(&self, event: ButtonEvent) -> bool {
        match event {
            ButtonEvent::Press => self.press,
            ButtonEvent::Release => self.release,
            ButtonEvent::Click => self.click,
            ButtonEvent::DoubleClick => self.double_click,
            ButtonEvent::Hold => self.hold,
        }
    }

    fn insert(&mut self, event: ButtonEvent) {
        match event {
            ButtonEvent::Press => self.press = true,
            ButtonEvent::Release => self.release = true,
            ButtonEvent::Click => self.click = true,
            ButtonEvent::DoubleClick => self.double_click = true,
            ButtonEvent::Hold => self.hold = true,
        }
    }
}

/// 事件回调，可以捕获状态。调用时传入触发它的按钮本身。
pub type Handler<'h, S, C> = &'h mut dyn FnMut(&mut Button<'h, S, C>);

impl ButtonEvent {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        match self {
            ButtonEvent::Press => 0,
            ButtonEvent::Release => 1,
            ButtonEvent::Click => 2,
            ButtonEvent::DoubleClick => 3,
            ButtonEvent::Hold => 4,
        }
    }
}

struct Handlers<'h, S, C> {
    slots: [Option<Handler<'h, S, C>>; ButtonEvent::COUNT],
    // 自上次分发以来该槽位是否被注册或清除过
    touched: [bool; ButtonEvent::COUNT],
}

impl<'h, S, C> Handlers<'h, S, C> {
    const fn new() -> Self {
        Self {
            slots: [None, None, None, None, None],
            touched: [false; ButtonEvent::COUNT],
        }
    }

    fn set(&mut self, event: ButtonEvent, handler: Option<Handler<'h, S, C>>) {
        self.slots[event.index()] = handler;
        self.touched[event.index()] = true;
    }

    /// 取出回调准备调用。
    fn begin(&mut self, event: ButtonEvent) -> Option<Handler<'h, S, C>> {
        self.touched[event.index()] = false;
        self.slots[event.index()].take()
    }

    /// 调用结束后放回回调，除非调用期间槽位被重新注册或清除。
    fn finish(&mut self, event: ButtonEvent, handler: Handler<'h, S, C>) {
        if !self.touched[event.index()] {
            self.slots[event.index()] = Some(handler);
        }
    }
}

/// 轮询式按钮：每次 `process()` 读取一次采样，完成消抖并识别
/// 按下、释放、单击、双击和长按。
///
/// `process()` 必须由调用者以固定周期调用；回调在 `process()` 内同步执行。
pub struct Button<'h, S, C> {
    id: u8,
    sampler: S,
    clock: C,
    mode: PullMode,
    config: ButtonConfig,
    state: ButtonState,
    debounce_start: Option<Instant>,
    pressed_start: Option<Instant>,
    previous_pressed_start: Option<Instant>,
    released_at: Option<Instant>,
    double_click_found: bool,
    presses: u32,
    reported_presses: u32,
    hold_triggered: bool,
    // 本次 `process()` 的返回值，不受 `take_*` 影响
    recognized: Events,
    // 供 `peek_*`/`take_*` 查询的锁存副本
    last: Events,
    pressed_latch: bool,
    dispatching: bool,
    handlers: Handlers<'h, S, C>,
}

impl<'h, S: Sampler, C: Clock> Button<'h, S, C> {
    /// 创建一个新的按钮。
    ///
    /// # 参数
    /// * `id`: 物理输入线的标识，用于比较两个按钮是否相同。
    /// * `sampler`: 电平采样源。
    /// * `clock`: 单调时间源。
    /// * `mode`: 决定哪一种电平表示按下。
    /// * `config`: 时间参数。
    pub fn new(id: u8, sampler: S, clock: C, mode: PullMode, config: ButtonConfig) -> Self {
        Self {
            id,
            sampler,
            clock,
            mode,
            config,
            state: ButtonState::Released,
            debounce_start: None,
            pressed_start: None,
            previous_pressed_start: None,
            released_at: None,
            double_click_found: false,
            presses: 0,
            reported_presses: 0,
            hold_triggered: false,
            recognized: Events::default(),
            last: Events::default(),
            pressed_latch: false,
            dispatching: false,
            handlers: Handlers::new(),
        }
    }

    /// 读取一次采样并推进状态机，返回本次识别出的事件。
    ///
    /// 在回调内部调用时不做任何事，返回空的 `Events`。
    pub fn process(&mut self) -> Events {
        if self.dispatching {
            return Events::default();
        }
        let now = self.clock.now();
        let pressed = self.mode.is_pressed(self.sampler.is_high());
        self.recognized = Events::default();
        self.last = Events::default();

        if pressed != (self.state == ButtonState::Pressed) && self.debounce_passed(now) {
            if pressed {
                self.on_pressed(now);
            } else {
                self.on_released(now);
            }
        } else if pressed == (self.state == ButtonState::Pressed) {
            self.debounce_start = None;
        }

        if self.state == ButtonState::Pressed && !self.hold_triggered {
            let held = self.elapsed_since(self.pressed_start, now);
            if held >= self.config.hold_threshold {
                self.hold_triggered = true;
                trace!("button {} hold after {} ms", self.id, held.as_millis());
                self.emit(ButtonEvent::Hold);
            }
        }

        self.pressed_latch = self.state == ButtonState::Pressed;
        self.recognized
    }

    /// 消抖门：采样与当前状态不同时调用，返回是否接受这次变化。
    fn debounce_passed(&mut self, now: Instant) -> bool {
        let Some(debounce) = self.config.effective_debounce() else {
            return true;
        };
        match self.debounce_start {
            None => {
                self.debounce_start = Some(now);
                false
            }
            Some(start) if now.saturating_duration_since(start) >= debounce => {
                self.debounce_start = None;
                true
            }
            Some(_) => false,
        }
    }

    fn on_pressed(&mut self, now: Instant) {
        self.state = ButtonState::Pressed;
        self.previous_pressed_start = self.pressed_start;
        self.pressed_start = Some(now);
        self.presses = self.presses.wrapping_add(1);
        self.hold_triggered = false;
        if self.double_click_found
            && self.elapsed_since(self.released_at, now) > self.config.double_click_threshold
        {
            self.double_click_found = false;
        }
        trace!("button {} pressed at {} ms (#{})", self.id, now.as_millis(), self.presses);

        self.pressed_latch = true;
        self.mark_changed();
        self.emit(ButtonEvent::Press);
    }

    fn on_released(&mut self, now: Instant) {
        self.state = ButtonState::Released;
        self.released_at = Some(now);
        trace!("button {} released at {} ms", self.id, now.as_millis());

        self.pressed_latch = false;
        self.mark_changed();
        self.emit(ButtonEvent::Release);

        let held = self.elapsed_since(self.pressed_start, now);
        if held >= self.config.hold_threshold || self.hold_triggered {
            return;
        }

        let within_window = match (self.previous_pressed_start, self.pressed_start) {
            (Some(previous), Some(current)) => {
                current.saturating_duration_since(previous) <= self.config.double_click_threshold
            }
            _ => false,
        };
        if within_window && !self.double_click_found {
            self.double_click_found = true;
            trace!("button {} double click", self.id);
            self.emit(ButtonEvent::DoubleClick);
        } else {
            trace!("button {} click after {} ms", self.id, held.as_millis());
            self.emit(ButtonEvent::Click);
        }
    }

    /// 记录事件并调用对应的回调（若已注册）。
    ///
    /// 回调执行期间从槽位中取出，结束后放回，除非回调内注册了新的回调。
    fn emit(&mut self, event: ButtonEvent) {
        self.recognized.insert(event);
        self.last.insert(event);
        if let Some(handler) = self.handlers.begin(event) {
            self.dispatching = true;
            handler(self);
            self.dispatching = false;
            self.handlers.finish(event, handler);
        }
    }

    fn mark_changed(&mut self) {
        self.recognized.state_changed = true;
        self.last.state_changed = true;
    }

    fn elapsed_since(&self, since: Option<Instant>, now: Instant) -> Duration {
        since.map_or(Duration::from_ticks(0), |t| now.saturating_duration_since(t))
    }

    /// 注册某一事件的回调，覆盖之前注册的回调。
    pub fn register_handler(&mut self, event: ButtonEvent, handler: Handler<'h, S, C>) {
        self.handlers.set(event, Some(handler));
    }

    /// 注册回调并同时设置关联阈值。
    ///
    /// 仅 `Hold`（长按阈值）和 `DoubleClick`（双击窗口）有关联阈值，
    /// 其他事件忽略 `threshold`。
    pub fn register_handler_with_threshold(
        &mut self,
        event: ButtonEvent,
        handler: Handler<'h, S, C>,
        threshold: Duration,
    ) {
        match event {
            ButtonEvent::Hold => self.config.hold_threshold = threshold,
            ButtonEvent::DoubleClick => self.config.double_click_threshold = threshold,
            _ => {}
        }
        self.register_handler(event, handler);
    }

    /// 移除某一事件的回调；在该回调内部调用同样有效。
    pub fn clear_handler(&mut self, event: ButtonEvent) {
        self.handlers.set(event, None);
    }

    /// 最近一次 `process()` 后按钮是否处于按下状态，不清除标志。
    pub fn peek_pressed(&self) -> bool {
        self.pressed_latch
    }

    /// 同 `peek_pressed`，但会清除标志，直到下一次 `process()`。
    pub fn take_pressed(&mut self) -> bool {
        core::mem::take(&mut self.pressed_latch)
    }

    /// 最近一次 `process()` 是否发生了按下到释放的转换。
    pub fn peek_was_pressed(&self) -> bool {
        self.last.release
    }

    /// 同 `peek_was_pressed`，但会清除标志。
    pub fn take_was_pressed(&mut self) -> bool {
        core::mem::take(&mut self.last.release)
    }

    /// 最近一次 `process()` 是否接受了任何状态变化。
    pub fn peek_state_changed(&self) -> bool {
        self.last.state_changed
    }

    /// 同 `peek_state_changed`，但会清除标志。
    pub fn take_state_changed(&mut self) -> bool {
        core::mem::take(&mut self.last.state_changed)
    }

    /// 最近一次 `process()` 是否识别出双击。
    pub fn peek_double_clicked(&self) -> bool {
        self.last.double_click
    }

    /// 同 `peek_double_clicked`，但会清除标志。
    pub fn take_double_clicked(&mut self) -> bool {
        core::mem::take(&mut self.last.double_click)
    }

    /// 每次新的按下只返回一次 `true`，与轮询频率无关。
    pub fn unique_press(&mut self) -> bool {
        if self.presses != self.reported_presses {
            self.reported_presses = self.presses;
            true
        } else {
            false
        }
    }

    /// 当前按下且持续时间超过配置的长按阈值。
    pub fn held(&self) -> bool {
        self.held_for(self.config.hold_threshold)
    }

    /// 当前按下且持续时间超过 `time`。
    pub fn held_for(&self, time: Duration) -> bool {
        self.state == ButtonState::Pressed
            && self.elapsed_since(self.pressed_start, self.clock.now()) > time
    }

    /// 按下中返回已按下的时长，否则返回上一次完整按下的时长。
    pub fn hold_time(&self) -> Duration {
        match self.state {
            ButtonState::Pressed => self.elapsed_since(self.pressed_start, self.clock.now()),
            ButtonState::Released => match (self.pressed_start, self.released_at) {
                (Some(start), Some(end)) => end.saturating_duration_since(start),
                _ => Duration::from_ticks(0),
            },
        }
    }

    /// 不断以 `period` 为周期调用 `process()`，直到某次调用识别出事件。
    pub async fn next_events(&mut self, period: Duration) -> Events {
        let mut ticker = Ticker::every(period);
        loop {
            let events = self.process();
            if events.any() {
                return events;
            }
            ticker.next().await;
        }
    }

    /// 以 `period` 为周期永久调用 `process()`，事件通过回调分发。
    pub async fn run(&mut self, period: Duration) -> ! {
        let mut ticker = Ticker::every(period);
        loop {
            self.process();
            ticker.next().await;
        }
    }
}

impl<'h, S, C> Button<'h, S, C> {
    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// 已接受的按下次数，只增不减。
    pub fn presses(&self) -> u32 {
        self.presses
    }

    pub fn pull_mode(&self) -> PullMode {
        self.mode
    }

    /// 修改电平解释方式，不会重新判定当前状态。
    pub fn set_pull_mode(&mut self, mode: PullMode) {
        self.mode = mode;
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }

    pub fn set_config(&mut self, new_config: ButtonConfig) {
        self.config = new_config;
    }

    pub fn set_debounce(&mut self, debounce: Option<Duration>) {
        self.config.debounce = debounce;
    }

    pub fn hold_threshold(&self) -> Duration {
        self.config.hold_threshold
    }

    pub fn set_hold_threshold(&mut self, threshold: Duration) {
        self.config.hold_threshold = threshold;
    }

    pub fn double_click_threshold(&self) -> Duration {
        self.config.double_click_threshold
    }

    pub fn set_double_click_threshold(&mut self, threshold: Duration) {
        self.config.double_click_threshold = threshold;
    }

    /// 获取采样源的不可变引用
    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// 获取采样源的可变引用
    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// 重置按钮状态到初始释放状态。
    ///
    /// 清除计时、标志和双击窗口；按下计数、配置和回调保留。
    pub fn reset(&mut self) {
        self.state = ButtonState::Released;
        self.debounce_start = None;
        self.pressed_start = None;
        self.previous_pressed_start = None;
        self.released_at = None;
        self.double_click_found = false;
        self.hold_triggered = false;
        self.recognized = Events::default();
        self.last = Events::default();
        self.pressed_latch = false;
        self.reported_presses = self.presses;
    }
}

/// 两个按钮相同当且仅当它们对应同一条物理输入线。
impl<'a, 'b, S1, C1, S2, C2> PartialEq<Button<'b, S2, C2>> for Button<'a, S1, C1> {
    fn eq(&self, other: &Button<'b, S2, C2>) -> bool {
        self.id == other.id
    }
}

impl<'h, S, C> Eq for Button<'h, S, C> {}
