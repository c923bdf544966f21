use super::LoopToken;

/// Tracks the animation-frame request that drives a player's loop.
///
/// At most one request is pending at any time. Starting a loop while a
/// request is queued only swaps the token that request will tick with, so a
/// quick pause and play, or a repeated play, never queues a second request.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameRequests {
    token: Option<LoopToken>,
    pending: bool,
}

impl FrameRequests {
    /// Hands the loop over to `token`. Returns true when the caller has to
    /// issue a new request.
    pub fn start(&mut self, token: LoopToken) -> bool {
        self.token = Some(token);
        self.request()
    }

    /// Called when the pending request fires. Returns the token to tick with.
    pub fn fire(&mut self) -> Option<LoopToken> {
        self.pending = false;
        self.token
    }

    /// Called after a tick that asked to continue. Returns true when the
    /// caller has to issue a new request.
    pub fn reschedule(&mut self) -> bool {
        self.request()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    fn request(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }
}
