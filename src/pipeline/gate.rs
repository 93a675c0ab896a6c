use super::{RenderRequest, RenderResult, SegmentationOverlayPipeline};
use crate::error::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError};

/// What happened to a submitted frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// This call rendered `frames` requests, including any that were
    /// collapsed into the pending slot while it held the pipeline.
    Rendered { frames: usize },
    /// A render was already in flight; the frame waits in the pending
    /// slot and is rendered by that call unless a newer one replaces it.
    Queued,
}

/// Serializes renders for callers that submit frames faster than they can
/// be processed, e.g. from a capture callback.
///
/// At most one render runs at a time. Frames arriving meanwhile collapse
/// into a single pending slot where the newest wins. Readers get the last
/// complete result through [`FrameGate::latest`] without waiting on a
/// render in progress.
pub struct FrameGate {
    pipeline: Mutex<SegmentationOverlayPipeline>,
    pending: Mutex<Option<RenderRequest>>,
    latest: RwLock<Option<Arc<RenderResult>>>,
}

impl FrameGate {
    pub fn new(pipeline: SegmentationOverlayPipeline) -> Self {
        let latest = pipeline.current();
        Self {
            pipeline: Mutex::new(pipeline),
            pending: Mutex::new(None),
            latest: RwLock::new(latest),
        }
    }

    /// Render `request`, or park it if another render is in flight
    ///
    /// # Arguments
    /// * `request` - Owned frame inputs
    ///
    /// # Returns
    /// * `Rendered` - this call held the pipeline and drained the pending slot
    /// * `Queued` - another call is rendering and will pick the frame up
    ///
    /// # Errors
    /// Invalid label buffers and blur radii are rejected here, before the
    /// frame is queued, so the error always reaches its own submitter.
    pub fn submit(&self, request: RenderRequest) -> Result<SubmitOutcome> {
        request.validate()?;

        if lock(&self.pending).replace(request).is_some() {
            tracing::debug!("Dropped a superseded pending frame");
        }

        let mut rendered = 0;
        loop {
            let mut pipeline = match self.pipeline.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) if rendered == 0 => {
                    return Ok(SubmitOutcome::Queued);
                }
                Err(TryLockError::WouldBlock) => break,
            };

            while let Some(request) = self.take_pending() {
                rendered += 1;
                if let Some(result) = pipeline.render_request(&request)? {
                    *self.latest.write().unwrap_or_else(PoisonError::into_inner) = Some(result);
                }
            }
            drop(pipeline);

            // A frame may have landed after the last take but before the
            // pipeline was released; its submitter saw WouldBlock.
            if lock(&self.pending).is_none() {
                break;
            }
        }

        Ok(SubmitOutcome::Rendered { frames: rendered })
    }

    /// Last complete result
    pub fn latest(&self) -> Option<Arc<RenderResult>> {
        self.latest.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear(&self) {
        lock(&self.pipeline).clear();
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn into_inner(self) -> SegmentationOverlayPipeline {
        self.pipeline.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_pending(&self) -> Option<RenderRequest> {
        lock(&self.pending).take()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
