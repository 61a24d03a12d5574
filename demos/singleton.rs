//! # Example: singleton
//!
//! Two threads race to create the process-wide broadcaster with different
//! initial payloads. Both end up with the same instance.
//!
//! ## Run
//! ```bash
//! cargo run --example singleton
//! ```

use std::thread;
use std::time::Duration;

use subcast::{Config, global_with};

fn init(value: &'static str) -> &'static subcast::Broadcaster {
    // emulates slow initialization
    thread::sleep(Duration::from_millis(100));
    global_with(Config {
        initial_payload: value.into(),
        ..Config::default()
    })
}

fn main() -> anyhow::Result<()> {
    println!("same value twice: the instance was reused\n\nRESULT:");

    let foo = thread::spawn(|| init("FOO"));
    let bar = thread::spawn(|| init("BAR"));
    let foo = foo.join().map_err(|_| anyhow::anyhow!("FOO thread panicked"))?;
    let bar = bar.join().map_err(|_| anyhow::anyhow!("BAR thread panicked"))?;

    println!("{}", foo.payload());
    println!("{}", bar.payload());
    anyhow::ensure!(foo.ptr_eq(bar), "two broadcasters were created");
    Ok(())
}
