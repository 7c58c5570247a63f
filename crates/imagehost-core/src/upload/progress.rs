//! Upload progress reporting.
//!
//! Progress is a percentage split across the handshake:
//!
//! | Range   | Phase                                   |
//! |---------|-----------------------------------------|
//! | 0       | idle / not started                      |
//! | 25      | upload slot issued                      |
//! | 25..=75 | direct upload, proportional to bytes    |
//! | 100     | metadata committed                      |
//!
//! Within one upload the value never decreases. It only returns to 0
//! through [`UploadProgress::reset`], which the host calls after a short
//! grace period so the final value stays visible.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

pub const SLOT_ISSUED: u8 = 25;
pub const TRANSFER_COMPLETE: u8 = 75;
pub const COMMITTED: u8 = 100;

const TRANSFER_SPAN: u64 = (TRANSFER_COMPLETE - SLOT_ISSUED) as u64;

type Listener = Box<dyn Fn(u8)>;

#[derive(Default)]
struct Inner {
    percent: Cell<u8>,
    listener: RefCell<Option<Listener>>,
}

/// Shared progress handle.
///
/// Cheap to clone; all clones observe the same value. Transports receive a
/// clone so byte-level callbacks can report into it.
#[derive(Clone, Default)]
pub struct UploadProgress {
    inner: Rc<Inner>,
}

impl UploadProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle that calls `listener` on every change.
    pub fn with_listener(listener: impl Fn(u8) + 'static) -> Self {
        let progress = Self::new();
        progress.set_listener(listener);
        progress
    }

    pub fn set_listener(&self, listener: impl Fn(u8) + 'static) {
        *self.inner.listener.borrow_mut() = Some(Box::new(listener));
    }

    /// Stop notifying the previous listener.
    pub fn clear_listener(&self) {
        *self.inner.listener.borrow_mut() = None;
    }

    pub fn percent(&self) -> u8 {
        self.inner.percent.get()
    }

    /// Move forward to `percent`. Lower values are ignored.
    pub fn advance(&self, percent: u8) {
        let percent = percent.min(COMMITTED);
        if percent > self.percent() {
            self.set(percent);
        }
    }

    /// Report bytes sent during the direct upload.
    pub fn record_transfer(&self, sent: u64, total: u64) {
        self.advance(transfer_percent(sent, total));
    }

    /// Back to 0, e.g. after the grace delay following completion or failure.
    pub fn reset(&self) {
        if self.percent() != 0 {
            self.set(0);
        }
    }

    fn set(&self, percent: u8) {
        self.inner.percent.set(percent);
        if let Some(listener) = self.inner.listener.borrow().as_ref() {
            listener(percent);
        }
    }
}

impl fmt::Debug for UploadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadProgress")
            .field("percent", &self.percent())
            .finish()
    }
}

/// `25 + floor(sent / total * 50)`, clamped to the transfer phase.
///
/// An unknown total (0) counts as a finished transfer.
pub fn transfer_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return TRANSFER_COMPLETE;
    }
    let sent = u128::from(sent.min(total));
    let scaled = sent * u128::from(TRANSFER_SPAN) / u128::from(total);
    SLOT_ISSUED + scaled as u8
}


// ============================================================================
// Property-Based Tests
// ============================================================================
