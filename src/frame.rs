/// Identifies one requested frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Per-repaint callback scheduling, as provided by the host.
pub trait FrameScheduler {
    /// Asks for one callback before the next repaint.
    fn request_frame(&mut self) -> FrameHandle;
    /// Drops a pending request. Cancelling an unknown or fired handle is a no-op.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Host-side queue of pending frame requests. The host drains it once per
/// repaint with [`FrameQueue::take_due`] and hands every handle back to its owner.
#[derive(Debug, Default)]
pub struct FrameQueue {
    last_id: u64,
    pending: Vec<FrameHandle>,
}

impl FrameQueue {
    pub fn new() -> FrameQueue {
        FrameQueue::default()
    }

    /// Requests that fire on this repaint. Requests made while handling them
    /// wait for the next one.
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.contains(&handle)
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        self.last_id += 1;
        let handle = FrameHandle(self.last_id);
        self.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|pending| *pending != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique() {
        let mut queue = FrameQueue::new();
        let a = queue.request_frame();
        let b = queue.request_frame();
        assert_ne!(a, b);
        assert_eq!(queue.pending(), 2);
    }

    #[test]
    fn cancelled_request_never_fires() {
        let mut queue = FrameQueue::new();
        let a = queue.request_frame();
        let b = queue.request_frame();
        queue.cancel_frame(a);
        assert!(!queue.is_pending(a));
        assert_eq!(queue.take_due(), vec![b]);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn cancelling_twice_is_harmless() {
        let mut queue = FrameQueue::new();
        let a = queue.request_frame();
        queue.cancel_frame(a);
        queue.cancel_frame(a);
        assert!(queue.take_due().is_empty());
    }
}
