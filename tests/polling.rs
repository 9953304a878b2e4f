use std::{
    cell::Cell,
    sync::atomic::{AtomicBool, Ordering},
};

use embassy_debounced_button::{Button, ButtonConfig, ButtonEvent, EmbassyClock, PullMode, Sampler};
use embassy_time::{Duration, Timer};

// --- Mock Hardware (模拟硬件) ---

/// 由测试任务改变电平的输入线。
struct Line<'a>(&'a AtomicBool);

impl Sampler for Line<'_> {
    fn is_high(&mut self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

type PolledButton<'h, 'a> = Button<'h, Line<'a>, EmbassyClock>;

const PERIOD: Duration = Duration::from_millis(5);

// 1. 事件生成器：一次单击，随后一次长按
async fn event_generator(level: &AtomicBool) {
    level.store(true, Ordering::Relaxed);
    Timer::after(Duration::from_millis(50)).await;

    // 单击
    level.store(false, Ordering::Relaxed);
    Timer::after(Duration::from_millis(100)).await;
    level.store(true, Ordering::Relaxed);
    Timer::after(Duration::from_millis(100)).await;

    // 长按
    level.store(false, Ordering::Relaxed);
    Timer::after(Duration::from_millis(700)).await;
    level.store(true, Ordering::Relaxed);
}

// 2. 事件验证器
async fn event_validator(mut button: PolledButton<'_, '_>) {
    let expected = [
        ButtonEvent::Press,
        ButtonEvent::Click,
        ButtonEvent::Press,
        ButtonEvent::Hold,
        ButtonEvent::Release,
    ];

    for kind in expected {
        let events = embassy_time::with_timeout(Duration::from_secs(2), button.next_events(PERIOD))
            .await
            .expect("Test timed out waiting for an event");
        assert!(events.contains(kind), "expected {kind:?}, got {events:?}");
    }
}

#[tokio::test]
async fn test_next_events_with_embassy_clock() {
    let level = AtomicBool::new(true);
    let button = Button::new(
        4,
        Line(&level),
        EmbassyClock,
        PullMode::PullUp,
        ButtonConfig::default(),
    );

    tokio::join!(event_generator(&level), event_validator(button));
}

#[tokio::test]
async fn test_run_dispatches_handlers() {
    let level = AtomicBool::new(true);
    let clicks = Cell::new(0u32);
    let holds = Cell::new(0u32);
    let mut on_click = |_: &mut PolledButton<'_, '_>| clicks.set(clicks.get() + 1);
    let mut on_hold = |_: &mut PolledButton<'_, '_>| holds.set(holds.get() + 1);

    let mut button = Button::new(
        4,
        Line(&level),
        EmbassyClock,
        PullMode::PullUp,
        ButtonConfig::default(),
    );
    button.register_handler(ButtonEvent::Click, &mut on_click);
    button.register_handler(ButtonEvent::Hold, &mut on_hold);

    let runner = async {
        let result = embassy_time::with_timeout(Duration::from_millis(1500), button.run(PERIOD)).await;
        assert!(result.is_err());
    };
    tokio::join!(event_generator(&level), runner);

    assert_eq!(clicks.get(), 1);
    assert_eq!(holds.get(), 1);
}
