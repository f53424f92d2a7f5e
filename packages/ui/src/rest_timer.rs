//! Rest timer banner pinned to the bottom of every page.

use std::time::Duration;

use dioxus::prelude::*;
use store::clock::now_millis;
use store::timer::format_countdown;

use crate::icons::{FaStopwatch, FaXmark};
use crate::tracker::use_tracker;
use crate::{sleep, Icon};

/// Seconds added by the "+30s" button.
const EXTEND_SECS: u32 = 30;

/// Countdown for the running rest timer.
///
/// The remaining time is recomputed from the persisted start time on every tick, so a
/// tab that was hidden (and stopped ticking) shows the right value as soon as it is
/// visible again.
#[component]
pub fn RestTimerBanner() -> Element {
    let tracker = use_tracker();
    let mut now = use_signal(now_millis);

    use_effect(move || {
        spawn(async move {
            loop {
                sleep(Duration::from_secs(1)).await;
                now.set(now_millis());
            }
        });
    });

    let Some(timer) = (tracker.timer)() else {
        return rsx! {};
    };

    let now = now();
    let finished = timer.is_finished(now);
    let remaining = format_countdown(timer.remaining_secs(now));
    let width = format!("{:.1}%", timer.progress(now) * 100.0);
    let class = if finished {
        "rest-timer rest-timer--done"
    } else {
        "rest-timer"
    };

    rsx! {
        div {
            class: "{class}",
            role: "timer",
            div { class: "rest-timer__bar", style: "width: {width}" }
            div {
                class: "rest-timer__body",
                Icon { icon: FaStopwatch, width: 16, height: 16 }
                span { class: "rest-timer__label", "{timer.exercise_name}" }
                if finished {
                    span { class: "rest-timer__time", "Rest is over" }
                } else {
                    span { class: "rest-timer__time", "{remaining}" }
                    button {
                        class: "btn btn--ghost",
                        onclick: move |_| async move { tracker.extend_rest(EXTEND_SECS).await },
                        "+{EXTEND_SECS}s"
                    }
                }
                button {
                    class: "btn btn--ghost",
                    title: "Dismiss",
                    onclick: move |_| async move { tracker.stop_rest().await },
                    Icon { icon: FaXmark, width: 14, height: 14 }
                }
            }
        }
    }
}
