//! # Process-wide broadcaster.
//!
//! A lazily created [`Broadcaster`] shared by the whole process.
//! Initialization runs exactly once through [`OnceLock`], even when several
//! threads race to the first access; every caller gets the same instance.
//!
//! ```text
//! thread A ── global_with(cfg_a) ──┐
//!                                  ├──► OnceLock::get_or_init ──► one Broadcaster
//! thread B ── global_with(cfg_b) ──┘      (first initializer wins, the other config is ignored)
//! ```

use std::sync::OnceLock;

use crate::core::broadcaster::Broadcaster;
use crate::core::config::Config;

static GLOBAL: OnceLock<Broadcaster> = OnceLock::new();

/// Returns the process-wide broadcaster, creating it with [`Config::default`]
/// on first use.
pub fn global() -> &'static Broadcaster {
    GLOBAL.get_or_init(Broadcaster::default)
}

/// Returns the process-wide broadcaster, creating it with `config` on first use.
///
/// If it already exists, `config` is ignored; compare
/// `global_with(..).config()` to find out which configuration won.
pub fn global_with(config: Config) -> &'static Broadcaster {
    GLOBAL.get_or_init(|| Broadcaster::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Payload;
    use std::sync::Barrier;

    // The only test in the crate touching the process-wide instance.
    #[test]
    fn test_concurrent_first_access_yields_one_instance() {
        let barrier = Barrier::new(2);
        let (foo, bar) = std::thread::scope(|scope| {
            let foo = scope.spawn(|| {
                barrier.wait();
                global_with(Config {
                    initial_payload: Payload::from("FOO"),
                    ..Config::default()
                })
            });
            let bar = scope.spawn(|| {
                barrier.wait();
                global_with(Config {
                    initial_payload: Payload::from("BAR"),
                    ..Config::default()
                })
            });
            (foo.join().unwrap(), bar.join().unwrap())
        });

        assert!(foo.ptr_eq(bar));
        assert!(global().ptr_eq(foo));
        assert_eq!(foo.payload(), bar.payload());
        assert!(matches!(&*foo.payload(), "FOO" | "BAR"));
    }
}
