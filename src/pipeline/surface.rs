use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::pipeline::selection::Selection;
use crate::video::Frame;

/// The most recently presented frame
///
/// Double-buffered: the frame loop renders into its own back buffer and
/// `publish` swaps it with the front buffer under the lock, so readers always
/// see a complete frame and neither side allocates per frame.
#[derive(Debug)]
pub struct Surface {
    inner: Mutex<Presented>,
}

#[derive(Debug)]
struct Presented {
    front: Frame,
    rendered_with: Selection,
    sequence: u64,
}

impl Surface {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Presented {
                front: Frame::new_blank(0, 0),
                rendered_with: Selection::default(),
                sequence: 0,
            }),
        }
    }

    // A panic elsewhere cannot leave a half-swapped frame behind
    fn lock(&self) -> MutexGuard<'_, Presented> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Present `back`, rendered with `rendered_with`, handing the previous
    /// front buffer back to the caller
    pub fn publish(&self, back: &mut Frame, rendered_with: Selection) {
        let mut presented = self.lock();
        std::mem::swap(&mut presented.front, back);
        presented.rendered_with = rendered_with;
        presented.sequence += 1;
    }

    /// Copy of the presented frame, `None` before the first publish
    pub fn snapshot(&self) -> Option<Frame> {
        let presented = self.lock();
        (presented.sequence > 0).then(|| presented.front.clone())
    }

    /// Copy of the presented frame and the selection it was rendered with,
    /// taken under one lock
    pub fn snapshot_with_selection(&self) -> Option<(Frame, Selection)> {
        let presented = self.lock();
        (presented.sequence > 0)
            .then(|| (presented.front.clone(), presented.rendered_with.clone()))
    }

    /// Copy the presented frame into `target`, reusing its allocation
    ///
    /// Returns false (leaving `target` untouched) before the first publish.
    pub fn snapshot_into(&self, target: &mut Frame) -> bool {
        let presented = self.lock();
        if presented.sequence == 0 {
            return false;
        }
        target.copy_from(&presented.front);
        true
    }

    /// Number of frames presented so far
    pub fn presented(&self) -> u64 {
        self.lock().sequence
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}
