use std::sync::Arc;

use crate::assets::SourceFrame;

/// Anything the sketch can sample from: a still image or a live stream.
///
/// Sources report `(0, 0)` dimensions until they have a frame to offer.
pub trait MediaSource: Send {
    fn label(&self) -> &str;

    fn dimensions(&self) -> (u32, u32);

    /// Newest available frame, if any.
    fn frame(&self) -> Option<Arc<SourceFrame>>;

    fn is_ready(&self) -> bool {
        let (w, h) = self.dimensions();
        w > 0 && h > 0
    }
}

/// A decoded still image exposed as a media source.
#[derive(Clone, Debug)]
pub struct StillSource {
    name: String,
    frame: Arc<SourceFrame>,
}

impl StillSource {
    pub fn new(name: impl Into<String>, frame: Arc<SourceFrame>) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }
}

impl MediaSource for StillSource {
    fn label(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    fn frame(&self) -> Option<Arc<SourceFrame>> {
        Some(Arc::clone(&self.frame))
    }
}
