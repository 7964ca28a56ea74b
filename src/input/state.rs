/// Semantic view of the device, rebuilt from the raw event stream.
///
/// Values are raw device units; the last report for a control wins.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeviceState {
    /// X/Y/Z position axes
    pub position: [i32; 3],
    /// X/Y/Z rotation axes
    pub rotation: [i32; 3],
    /// Throttle, rudder, wheel and gas sliders
    pub sliders: [i32; 4],
    /// POV hats, each reported as a (horizontal, vertical) pair
    pub hats: [[i32; 2]; 4],
}
