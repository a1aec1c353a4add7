//! Work units and the shared pool workers claim them from.

use std::sync::{Mutex, PoisonError};

use geoharvest_core::{Landmark, Polyline};

/// A landmark together with the approach paths sampled around it.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    /// Subject of every viewpoint generated for this site.
    pub landmark: Landmark,
    /// Paths whose samples become extra viewpoints.
    pub paths: Vec<Polyline>,
}

impl Site {
    /// Site with no approach paths.
    #[must_use]
    pub const fn new(landmark: Landmark) -> Self {
        Self {
            landmark,
            paths: Vec::new(),
        }
    }

    /// Attach approach paths.
    #[must_use]
    pub fn with_paths(mut self, paths: Vec<Polyline>) -> Self {
        self.paths = paths;
        self
    }
}

/// The unit of work a single worker claims, e.g. all landmarks of one city.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkUnit {
    /// Identifier used in logs and the claim log.
    pub name: String,
    /// Sites processed sequentially by the claiming worker.
    pub sites: Vec<Site>,
}

impl WorkUnit {
    /// Construct a unit.
    #[must_use]
    pub fn new(name: impl Into<String>, sites: Vec<Site>) -> Self {
        Self {
            name: name.into(),
            sites,
        }
    }
}

/// Mutex-guarded stack of unclaimed units.
///
/// Units are handed out last-in first-out, each paired with its position in
/// the input. The pool is pop-only: nothing is pushed back once a run starts.
#[derive(Debug)]
pub(crate) struct WorkPool {
    units: Mutex<Vec<(usize, WorkUnit)>>,
}

impl WorkPool {
    pub(crate) fn new(units: Vec<WorkUnit>) -> Self {
        Self {
            units: Mutex::new(units.into_iter().enumerate().collect()),
        }
    }

    /// Remove and return the next unit with its input position, or `None`
    /// when the pool is drained.
    pub(crate) fn claim(&self) -> Option<(usize, WorkUnit)> {
        self.units
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.units
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn claims_are_last_in_first_out() {
        let pool = WorkPool::new(vec![
            WorkUnit::new("Cluj", Vec::new()),
            WorkUnit::new("Iasi", Vec::new()),
        ]);
        assert_eq!(pool.len(), 2);
        assert_eq!(
            pool.claim().map(|(i, u)| (i, u.name)),
            Some((1, "Iasi".to_owned()))
        );
        assert_eq!(
            pool.claim().map(|(i, u)| (i, u.name)),
            Some((0, "Cluj".to_owned()))
        );
        assert!(pool.claim().is_none());
        assert_eq!(pool.len(), 0);
    }
}
