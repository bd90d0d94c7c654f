//! Facade over the rune gear runtime crates.
//!
//! ```
//! use rune::GearRuntime;
//! use rune::config::RuneConfig;
//!
//! let mut config = RuneConfig::load_or_default();
//! config.merge_with_env();
//! let runtime = GearRuntime::from_config(&config);
//! runtime.advance(1.0 / 60.0);
//! ```

pub use rune_config as config;
pub use rune_io as io;
pub use rune_scene as scene;

pub use rune_scene::{
    AnyGear, Controller, EaseType, Gear, GearKind, GearRuntime, GearSet, Owner, TweenManager,
    Tweener,
};
