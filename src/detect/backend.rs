use anyhow::Result;

use crate::detect::result::Detection;

/// Detector backend trait.
///
/// A backend wraps one pretrained model artifact and exposes it through a
/// single `detect` call. Everything the model does internally (region
/// proposals, non-max suppression, classification) is opaque to the caller;
/// the contract is pixels in, post-NMS boxes out.
///
/// Implementations must treat the pixel slice as read-only and ephemeral:
/// no retention beyond the call, no disk writes, no network requests.
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on a packed RGB8 frame.
    ///
    /// Returned boxes are in original-image pixel coordinates.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
