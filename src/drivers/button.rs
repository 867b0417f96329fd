//! Interrupt-side button bank.
//!
//! ## Hardware
//!
//! One active-low momentary switch per [`ControlId`], falling-edge
//! interrupt. The handler is [`ButtonBank::on_edge`]: it rejects bounces
//! inside [`DEBOUNCE_MS`] of the last accepted edge and forwards accepted
//! edges to [`on_control_edge`].
//!
//! Everything here is lock-free (one atomic timestamp per control), so the
//! handler is safe from interrupt context and from any thread.

use core::sync::atomic::{AtomicU64, Ordering};

use crate::selector::{ControlId, on_control_edge};
use crate::state::ChannelStore;

pub const DEBOUNCE_MS: u64 = 50;

/// Sentinel for "no edge accepted yet".
const NEVER: u64 = u64::MAX;

pub struct ButtonBank<'a> {
    store: &'a ChannelStore,
    /// Timestamp of the last accepted edge per control.
    last_edge_ms: [AtomicU64; ControlId::COUNT],
}

impl<'a> ButtonBank<'a> {
    pub fn new(store: &'a ChannelStore) -> Self {
        Self {
            store,
            last_edge_ms: [const { AtomicU64::new(NEVER) }; ControlId::COUNT],
        }
    }

    /// Falling-edge handler. Returns whether the edge was accepted.
    pub fn on_edge(&self, control: ControlId, now_ms: u64) -> bool {
        let slot = &self.last_edge_ms[control as usize];
        let accepted = slot
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                (last == NEVER || now_ms.wrapping_sub(last) >= DEBOUNCE_MS).then_some(now_ms)
            })
            .is_ok();
        if accepted {
            on_control_edge(self.store, control);
        }
        accepted
    }
}
