//! Calls out to the scripting host.

/// Receiver of everything the engine forwards to user code.
///
/// Every method has an empty default so hosts implement only what they use.
pub trait Host {
    /// Call a function by name (`onclick`, `onchange`, canvas `ondraw`,
    /// timers, [`Engine::call_function`](crate::app::Engine::call_function)).
    fn call(&mut self, _function: &str) {}

    /// Long-press on a button (`onhold`).
    fn hold(&mut self, _function: &str) {}

    /// Tap on a canvas at local coordinates (`ontap`).
    fn tap(&mut self, _function: &str, _x: i32, _y: i32) {}

    /// Long-press on a canvas at local coordinates (`onhold`).
    fn hold_at(&mut self, _function: &str, _x: i32, _y: i32) {}

    /// A widget changed a bound variable; the host mirrors it in its own
    /// state before any `onchange` call.
    fn state_changed(&mut self, _name: &str, _value: &str) {}
}

/// Host that ignores every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl Host for NullHost {}
