//! # Example: observer
//!
//! Walks one broadcaster through attach, multi-subscriber notify and
//! mid-stream detach, printing every delivery.
//!
//! ## Flow
//! ```text
//! s1, s2, s3 attach
//!   publish("Hello World! :D")              → s1 s2 s3
//!   s3 detaches
//!   publish("The weather is hot today! :p") → s1 s2
//!   s4 attaches, s2 detaches, s5 attaches
//!   publish("My new car is great! ;)")      → s1 s4 s5
//!   s5, s4, s1 detach
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example observer --features logging
//! ```

use subcast::{Broadcaster, Config, LogWriter, Subscriber};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let broadcaster = Broadcaster::new(Config {
        initial_payload: "Empty".into(),
        ..Config::default()
    });
    let mut events = broadcaster.events();

    let s1 = Subscriber::attach(&broadcaster, LogWriter::new());
    let s2 = Subscriber::attach(&broadcaster, LogWriter::new());
    let s3 = Subscriber::attach(&broadcaster, LogWriter::new());
    println!("there are {} subscribers", broadcaster.count());

    broadcaster.publish("Hello World! :D");
    s3.detach();

    broadcaster.publish("The weather is hot today! :p");
    let s4 = Subscriber::attach(&broadcaster, LogWriter::new());

    s2.detach();
    let s5 = Subscriber::attach(&broadcaster, LogWriter::new());

    let report = broadcaster.publish("My new car is great! ;)");
    println!("delivered to {} subscribers", report.delivered);

    s5.detach();
    s4.detach();
    s1.detach();
    anyhow::ensure!(broadcaster.is_empty(), "all subscribers should be detached");

    while let Ok(ev) = events.try_recv() {
        println!(
            "[event] seq={} kind={:?} subscriber={:?} count={:?}",
            ev.seq, ev.kind, ev.subscriber, ev.count
        );
    }
    Ok(())
}
