/*
This file is part of morpho_core.
Copyright (C) 2026 the morpho_core contributors

morpho_core is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
//! Synchronous, fire-and-forget progress/status notifications (spec §5, §9).
//!
//! Implemented as a weak observer pattern: a list of listener handles owned
//! by the caller and passed by reference into the engines. There is no
//! back-pointer from a listener to the engine producing events, and there is
//! no process-wide registry.

use std::sync::Arc;

/// Receives progress and status notifications from a running engine.
///
/// Calls must be synchronous and non-blocking; the engines call these
/// methods inline from their own scan/queue loop and do not tolerate a
/// listener suspending the calling thread.
pub trait ProgressListener: Send + Sync {
    /// `fraction` is in `[0.0, 1.0]`.
    fn on_progress(&self, fraction: f64) {
        let _ = fraction;
    }

    fn on_status(&self, message: &str) {
        let _ = message;
    }
}

/// An ordered collection of listeners, cloned cheaply via `Arc` and shared
/// across an operation. Registration/removal is the caller's responsibility
/// — the list itself has no interior mutability.
#[derive(Clone, Default)]
pub struct ProgressList {
    listeners: Vec<Arc<dyn ProgressListener>>,
}

impl ProgressList {
    pub fn new() -> Self {
        ProgressList {
            listeners: Vec::new(),
        }
    }

    pub fn register(&mut self, listener: Arc<dyn ProgressListener>) {
        self.listeners.push(listener);
    }

    pub fn emit_progress(&self, fraction: f64) {
        log::trace!("progress: {:.1}%", fraction * 100.0);
        for listener in &self.listeners {
            listener.on_progress(fraction);
        }
    }

    pub fn emit_status(&self, message: &str) {
        log::debug!("{}", message);
        for listener in &self.listeners {
            listener.on_status(message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
