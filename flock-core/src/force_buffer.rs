//! Per-agent force accumulators written by the steering passes.

use crate::types::AgentId;
use glam::Vec2;

/// Output buffer of one steering pass: exactly one force per agent.
///
/// Each pass owns its buffer exclusively while it runs, so the parallel
/// passes of a frame never write to the same memory. The motion integrator
/// later reads several buffers and sums them per agent.
///
/// Internally, `forces[i]` corresponds to agent `i` of the owning population.
#[derive(Debug, Default)]
pub struct ForceBuffer {
    forces: Vec<Vec2>,
}

impl ForceBuffer {
    /// Creates a new [`ForceBuffer`] of `len` zero forces.
    ///
    /// ### Parameters
    /// - `len` - Number of agents this buffer stores a force for.
    pub fn with_len(len: usize) -> Self {
        Self {
            forces: vec![Vec2::ZERO; len],
        }
    }

    /// Ensures that the buffer has exactly `len` entries, all zero.
    ///
    /// If the length differs, the storage is resized. After this call all
    /// entries are cleared, even if the length was already correct.
    ///
    /// ### Parameters
    /// - `len` - Desired number of entries.
    pub fn ensure_len(&mut self, len: usize) {
        if self.forces.len() != len {
            self.forces.resize(len, Vec2::ZERO);
        }
        self.clear();
    }

    /// Resets every force to zero, keeping the length.
    pub fn clear(&mut self) {
        self.forces.fill(Vec2::ZERO);
    }

    pub fn len(&self) -> usize {
        self.forces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    /// Returns the force computed for `id`.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn get(&self, id: AgentId) -> Vec2 {
        self.forces[id]
    }

    pub fn as_slice(&self) -> &[Vec2] {
        &self.forces
    }

    /// Mutable view handed to exactly one steering pass.
    pub fn as_mut_slice(&mut self) -> &mut [Vec2] {
        &mut self.forces
    }

    /// Returns `true` if any agent received a non-zero force.
    pub fn any_nonzero(&self) -> bool {
        self.forces.iter().any(|f| *f != Vec2::ZERO)
    }
}

/// Sums the forces at `id` across several buffers.
///
/// ### Panics
/// Panics if any slice is shorter than `id + 1`.
#[inline]
pub fn sum_at(buffers: &[&[Vec2]], id: AgentId) -> Vec2 {
    buffers.iter().map(|b| b[id]).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_len_initializes_zeroed_state() {
        let buf = ForceBuffer::with_len(5);
        assert_eq!(buf.len(), 5);
        assert!(buf.as_slice().iter().all(|f| *f == Vec2::ZERO));
        assert!(!buf.any_nonzero());
    }

    #[test]
    fn ensure_len_keeps_length_and_clears_when_same() {
        let mut buf = ForceBuffer::with_len(3);
        buf.as_mut_slice()[1] = Vec2::new(1.0, 2.0);
        assert!(buf.any_nonzero());

        buf.ensure_len(3);

        assert_eq!(buf.len(), 3);
        assert!(!buf.any_nonzero());
    }

    #[test]
    fn ensure_len_resizes_and_clears_when_different() {
        let mut buf = ForceBuffer::with_len(2);
        buf.as_mut_slice()[0] = Vec2::X;

        buf.ensure_len(4);
        assert_eq!(buf.len(), 4);
        assert!(!buf.any_nonzero());

        buf.ensure_len(1);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.get(0), Vec2::ZERO);
    }

    #[test]
    fn sum_at_adds_every_buffer() {
        let a = [Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let b = [Vec2::new(2.0, 0.0), Vec2::new(0.0, -3.0)];
        let c = [Vec2::ZERO, Vec2::new(0.5, 0.5)];

        assert_eq!(sum_at(&[&a, &b, &c], 0), Vec2::new(3.0, 0.0));
        assert_eq!(sum_at(&[&a, &b, &c], 1), Vec2::new(0.5, -1.5));
        assert_eq!(sum_at(&[], 0), Vec2::ZERO);
    }
}
