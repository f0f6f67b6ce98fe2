//! Scoped edit sessions.
//!
//! ## Rust Lesson #13: RAII and Drop
//!
//! In JS you'd write `try { ... } finally { layer.rollback() }`.
//! In Rust the cleanup lives in `Drop`: when an `EditSession` goes out of
//! scope without `commit()` having been called - an early `?` return, a
//! panic, or just forgetting - the store's edit buffer is rolled back.

use tracing::debug;

use crate::error::Result;
use crate::feature::{Feature, FeatureId};
use crate::geometry::Geometry;
use crate::ports::FeatureStore;

/// An open edit session on a feature store.
pub struct EditSession<'a, S: FeatureStore + ?Sized> {
    store: &'a mut S,
    writes: usize,
    open: bool,
}

impl<'a, S: FeatureStore + ?Sized> EditSession<'a, S> {
    /// Open an edit session. Fails if the store already has one open.
    pub fn begin(store: &'a mut S) -> Result<Self> {
        store.begin_edit()?;
        Ok(Self {
            store,
            writes: 0,
            open: true,
        })
    }

    pub fn features(&self) -> Result<Vec<Feature>> {
        self.store.features()
    }

    pub fn get(&self, id: FeatureId) -> Result<Option<Geometry>> {
        self.store.get(id)
    }

    /// Buffer a geometry write for this session.
    pub fn write(&mut self, id: FeatureId, geometry: Geometry) -> Result<()> {
        self.store.write_geometry(id, geometry)?;
        self.writes += 1;
        Ok(())
    }

    /// Number of writes buffered so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Commit all buffered writes and close the session.
    ///
    /// If the commit itself fails the session is still rolled back by `Drop`.
    pub fn commit(mut self) -> Result<usize> {
        self.store.commit_edit()?;
        self.open = false;
        Ok(self.writes)
    }

    /// Discard all buffered writes and close the session.
    pub fn rollback(mut self) {
        self.store.rollback_edit();
        self.open = false;
    }
}

impl<S: FeatureStore + ?Sized> Drop for EditSession<'_, S> {
    fn drop(&mut self) {
        if self.open {
            debug!(writes = self.writes, "edit session dropped without commit, rolling back");
            self.store.rollback_edit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::geometry::{ring, Polygon};
    use crate::store::MemoryLayer;

    fn layer() -> MemoryLayer {
        MemoryLayer::polygons("parcels").with_geometry(Geometry::Empty)
    }

    fn square() -> Geometry {
        Geometry::Polygon(Polygon::new(ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)])))
    }

    #[test]
    fn commit_applies_writes() {
        let mut layer = layer();
        let mut session = EditSession::begin(&mut layer).unwrap();
        session.write(FeatureId(0), square()).unwrap();
        assert_eq!(session.commit().unwrap(), 1);

        assert_eq!(layer.get(FeatureId(0)).unwrap(), Some(square()));
        assert!(!layer.is_editing());
    }

    #[test]
    fn dropping_rolls_back() {
        let mut layer = layer();
        {
            let mut session = EditSession::begin(&mut layer).unwrap();
            session.write(FeatureId(0), square()).unwrap();
        }
        assert_eq!(layer.get(FeatureId(0)).unwrap(), Some(Geometry::Empty));
        assert!(!layer.is_editing());
    }

    #[test]
    fn failed_write_rolls_back_on_early_return() {
        fn write_two(layer: &mut MemoryLayer) -> Result<usize> {
            let mut session = EditSession::begin(layer)?;
            session.write(FeatureId(0), square())?;
            session.write(FeatureId(99), square())?;
            session.commit()
        }

        let mut layer = layer();
        let err = write_two(&mut layer).unwrap_err();
        assert!(matches!(err, StoreError::UnknownFeature(FeatureId(99))));
        assert_eq!(layer.get(FeatureId(0)).unwrap(), Some(Geometry::Empty));
        assert!(!layer.is_editing());
    }

    #[test]
    fn explicit_rollback_discards() {
        let mut layer = layer();
        let mut session = EditSession::begin(&mut layer).unwrap();
        session.write(FeatureId(0), square()).unwrap();
        session.rollback();
        assert_eq!(layer.committed_writes(), &[] as &[FeatureId]);
    }

    #[test]
    fn second_session_is_refused() {
        let mut layer = layer();
        layer.begin_edit().unwrap();
        assert!(matches!(EditSession::begin(&mut layer), Err(StoreError::EditInProgress(_))));
    }
}
