pub mod runner;

use std::rc::Rc;
use wasm_bindgen::prelude::*;
use tween_engine::Tweenable;

pub use runner::{AnimationFrameDriver, PerformanceClock};

/// Install the console logger and panic hook. Safe to call more than once.
pub fn init(level: log::Level) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(level);
}

/// A tween driven by the page's animation frames and timed by
/// `performance.now()`.
///
/// # Usage
///
/// ```ignore
/// tween_web::init(log::Level::Info);
/// let tween = tween_web::browser_tweenable()?;
/// tween.start(TweenConfig::new(from, to, 250.0).on_step(|s| {
///     log::info!("x = {}", s["x"]);
///     Ok(())
/// }))?;
/// ```
pub fn browser_tweenable() -> Result<Tweenable, JsValue> {
    let driver = AnimationFrameDriver::new()?;
    Ok(Tweenable::new(PerformanceClock::new(), Rc::new(driver)))
}

/// JS-callable setup: logging at info level and the panic hook.
#[wasm_bindgen]
pub fn tween_web_init() {
    init(log::Level::Info);
    log::info!("tween-web: initialized");
}
