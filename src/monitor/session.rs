// SPDX-License-Identifier: GPL-3.0-only
//! Scoped monitor sessions

use std::ops::{Deref, DerefMut};

use crate::protocols::VcpMonitor;

/// An open monitor. The monitor is closed when the session is dropped,
/// whichever way the operation using it ends.
pub struct Session<'a, M: VcpMonitor> {
    monitor: &'a mut M,
}

impl<'a, M: VcpMonitor> Session<'a, M> {
    pub fn open(monitor: &'a mut M) -> anyhow::Result<Self> {
        monitor.open()?;
        Ok(Self { monitor })
    }
}

impl<M: VcpMonitor> Deref for Session<'_, M> {
    type Target = M;

    fn deref(&self) -> &M {
        &*self.monitor
    }
}

impl<M: VcpMonitor> DerefMut for Session<'_, M> {
    fn deref_mut(&mut self) -> &mut M {
        &mut *self.monitor
    }
}

impl<M: VcpMonitor> Drop for Session<'_, M> {
    fn drop(&mut self) {
        self.monitor.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeMonitor, FakeState};

    #[test]
    fn test_session_closes_on_drop() {
        let state = FakeState::new("a").with_feature(0x10, 40).shared();
        let mut monitor = FakeMonitor::from(state.clone());

        {
            let mut session = Session::open(&mut monitor).unwrap();
            assert_eq!(session.get_luminance().unwrap(), 40);
            assert_eq!(state.borrow().closed, 0);
        }

        assert_eq!(state.borrow().opened, 1);
        assert_eq!(state.borrow().closed, 1);
    }

    #[test]
    fn test_session_closes_after_failed_operation() {
        let state = FakeState::new("a").shared();
        let mut monitor = FakeMonitor::from(state.clone());

        let result = (|| -> anyhow::Result<u16> {
            let mut session = Session::open(&mut monitor)?;
            session.get_luminance()
        })();

        assert!(result.is_err());
        assert_eq!(state.borrow().closed, 1);
    }

    #[test]
    fn test_failed_open_does_not_close() {
        let state = FakeState::new("a").failing_open().shared();
        let mut monitor = FakeMonitor::from(state.clone());

        assert!(Session::open(&mut monitor).is_err());
        assert_eq!(state.borrow().closed, 0);
    }
}
