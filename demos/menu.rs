//! A small menu rendered to `frame.png`.
//!
//! Type `up`, `down`, `select` or `cancel` (one per line) to press buttons.
//! Closing stdin exits.

use std::io::BufRead;
use std::time::{Duration, Instant};

use miniscreen::prelude::*;
use miniscreen::widgets::Text;

fn fake_update(props: &Props) -> Result<TaskPage, ConfigurationError> {
    let started = Instant::now();
    TaskPage::from_props(props, move || {
        if started.elapsed() < Duration::from_secs(3) {
            TaskStatus::Running
        } else {
            TaskStatus::Exited(0)
        }
    })
}

fn main() -> miniscreen::Result<()> {
    let registry = ComponentRegistry::with_builtins()
        .with("update", fake_update)
        .with("about", |_: &Props| Ok(Text::new("miniscreen demo")));

    let now_playing = carousel(vec![
        marquee_text("A very long track title that needs to scroll"),
        text("Artist").prop("align", "center"),
    ]);
    let clock = row(vec![text("12"), text(":"), text("00")]).prop("widths", vec![16i64, 8]);

    let root = navigator(list(vec![
        text("Now playing").prop("page", now_playing),
        text("Update").prop("page", Descriptor::new("update").prop("title", "Updating")),
        text("Clock").prop("page", clock),
        text("About"),
    ]))
    .prop("transition_ms", 200u32)
    .prop(
        "transitions",
        vec![transition(
            "list",
            Button::Cancel,
            Transition::Push(Descriptor::new("about")),
        )],
    );

    let (buttons, source) = button_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines().map_while(Result::ok) {
            let Some(button) = Button::from_name(line.trim()) else {
                eprintln!("unknown button {:?}", line.trim());
                continue;
            };
            if buttons.send(ButtonEvent::press(button)).is_err()
                || buttons.send(ButtonEvent::release(button)).is_err()
            {
                break;
            }
        }
    });

    let config = AppConfig::default()
        .dimming_timeout(Duration::from_secs(10))
        .screensaver(Duration::from_secs(30), marquee_text("zzz"));

    App::with_config(config)
        .registry(registry)
        .buttons(source)
        .run(root, PngDisplay::new("frame.png"))
}
