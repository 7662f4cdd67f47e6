use lumistrip_protocol::{
    AnimationInfo, CurrentStripColor, EndAnimation, Notice, RunningAnimationParams, Section,
    StripInfo,
};

/// Receives connection lifecycle and per-kind message events. Every method
/// has a no-op default, so implementors override only what they care
/// about. Subscribers are invoked in registration order, from the receive
/// loop, strictly in the order frames arrived on the wire.
#[allow(unused_variables)]
pub trait Subscriber: Send + Sync {
    fn connected(&self, addr: &str, port: u16) {}

    fn disconnected(&self, addr: &str, port: u16) {}

    fn connection_failed(&self, addr: &str, port: u16) {}

    /// Raw frame text, before decoding. Fires for every non-empty frame,
    /// including frames that subsequently fail to decode.
    fn frame_received(&self, raw: &str) {}

    fn animation_info(&self, info: &AnimationInfo) {}

    fn strip_color(&self, color: &CurrentStripColor) {}

    fn animation_ended(&self, end: &EndAnimation) {}

    fn notice(&self, notice: &Notice) {}

    fn animation_started(&self, params: &RunningAnimationParams) {}

    fn section_defined(&self, section: &Section) {}

    fn strip_info(&self, info: &StripInfo) {}
}
