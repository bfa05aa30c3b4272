//! Collective operations across the radial domain decomposition
//!
//! The coupling layer only needs a blocking all-reduce sum over a handful of
//! doubles. [`SingleProcess`] is the trivial one-rank case; [`LocalGroup`]
//! runs several ranks as threads of one process, which is what the tests and
//! shared-memory runs use.

use std::sync::{Arc, Barrier};

use parking_lot::Mutex;

/// Rank-collective operations
pub trait Communicator: Send + Sync {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    /// Element-wise sum of `values` over every rank, written back in place.
    ///
    /// Blocking: every rank must call it with a slice of the same length.
    /// Every rank receives bit-identical totals.
    fn all_reduce_sum(&self, values: &mut [f64]);

    fn is_master(&self) -> bool {
        self.rank() == 0
    }
}

/// A single rank owning the whole grid
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleProcess;

impl Communicator for SingleProcess {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce_sum(&self, _values: &mut [f64]) {}
}

#[derive(Debug)]
struct Shared {
    barrier: Barrier,
    slots: Mutex<Vec<Vec<f64>>>,
}

/// Factory for a group of in-process ranks
pub struct LocalGroup;

impl LocalGroup {
    /// Create `size` connected ranks. Hand one to each thread.
    ///
    /// # Examples
    ///
    /// ```
    /// use polargrid::comm::{Communicator, LocalGroup};
    ///
    /// let ranks = LocalGroup::new(3);
    /// let totals: Vec<f64> = std::thread::scope(|s| {
    ///     let handles: Vec<_> = ranks
    ///         .iter()
    ///         .map(|comm| {
    ///             s.spawn(move || {
    ///                 let mut v = [comm.rank() as f64 + 1.0];
    ///                 comm.all_reduce_sum(&mut v);
    ///                 v[0]
    ///             })
    ///         })
    ///         .collect();
    ///     handles.into_iter().map(|h| h.join().unwrap()).collect()
    /// });
    /// assert_eq!(totals, vec![6.0, 6.0, 6.0]);
    /// ```
    #[allow(clippy::new_ret_no_self)]
    pub fn new(size: usize) -> Vec<LocalRank> {
        let shared = Arc::new(Shared {
            barrier: Barrier::new(size.max(1)),
            slots: Mutex::new(vec![Vec::new(); size]),
        });
        (0..size)
            .map(|rank| LocalRank {
                rank,
                size,
                shared: Arc::clone(&shared),
            })
            .collect()
    }
}

/// One rank of a [`LocalGroup`]
#[derive(Debug)]
pub struct LocalRank {
    rank: usize,
    size: usize,
    shared: Arc<Shared>,
}

impl Communicator for LocalRank {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn all_reduce_sum(&self, values: &mut [f64]) {
        {
            let mut slots = self.shared.slots.lock();
            slots[self.rank].clear();
            slots[self.rank].extend_from_slice(values);
        }
        self.shared.barrier.wait();

        // Sum in rank order so every rank gets the same rounding
        {
            let slots = self.shared.slots.lock();
            for (idx, value) in values.iter_mut().enumerate() {
                *value = slots.iter().map(|s| s[idx]).fold(0.0, |acc, x| acc + x);
            }
        }

        // Nobody may overwrite a slot before every rank has read it
        self.shared.barrier.wait();
    }
}
