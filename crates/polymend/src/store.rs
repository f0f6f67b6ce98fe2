//! In-memory feature store.
//!
//! `MemoryLayer` is the reference [`FeatureStore`]: features live in a
//! `Vec` in insertion order, writes are buffered per edit session, and
//! every committed write is appended to a log so callers (and tests) can
//! see exactly what a run changed.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::feature::{infer_family, Feature, FeatureId, LayerInfo, LayerKind};
use crate::geometry::Geometry;
use crate::ports::FeatureStore;

#[derive(Debug, Clone)]
pub struct MemoryLayer {
    info: LayerInfo,
    features: Vec<Feature>,
    index: HashMap<FeatureId, usize>,
    selection: Vec<FeatureId>,
    /// Open edit buffer; `Some` while an edit session is active
    edits: Option<BTreeMap<FeatureId, Geometry>>,
    committed: Vec<FeatureId>,
    next_id: u64,
}

impl MemoryLayer {
    pub fn new(info: LayerInfo) -> Self {
        Self {
            info,
            features: Vec::new(),
            index: HashMap::new(),
            selection: Vec::new(),
            edits: None,
            committed: Vec::new(),
            next_id: 0,
        }
    }

    /// An empty polygon layer.
    pub fn polygons(name: impl Into<String>) -> Self {
        Self::new(LayerInfo::polygons(name))
    }

    /// Build a layer whose kind is inferred from the geometries.
    ///
    /// Ids are assigned from 0 in iteration order.
    pub fn from_geometries(name: impl Into<String>, geometries: Vec<Geometry>) -> Self {
        let family = infer_family(&geometries);
        let mut layer = Self::new(LayerInfo::new(name, LayerKind::Vector(family)));
        for geometry in geometries {
            layer.push(geometry);
        }
        layer
    }

    /// Builder-style [`push`](Self::push).
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.push(geometry);
        self
    }

    /// Append a feature with the next free id and return that id.
    ///
    /// The next free id is one past the largest id in use, so explicit
    /// [`insert`](Self::insert) ids are never reused.
    pub fn push(&mut self, geometry: Geometry) -> FeatureId {
        let id = FeatureId(self.next_id);
        self.insert(Feature { id, geometry });
        id
    }

    /// Append a feature with an explicit id, replacing any feature that had it.
    pub fn insert(&mut self, feature: Feature) {
        self.next_id = self.next_id.max(feature.id.0.saturating_add(1));
        match self.index.get(&feature.id) {
            Some(&pos) => self.features[pos] = feature,
            None => {
                self.index.insert(feature.id, self.features.len());
                self.features.push(feature);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn is_editing(&self) -> bool {
        self.edits.is_some()
    }

    /// Ids of every committed write, in commit order (repeats included).
    pub fn committed_writes(&self) -> &[FeatureId] {
        &self.committed
    }

    fn apply(&mut self, edits: BTreeMap<FeatureId, Geometry>) {
        for (id, geometry) in edits {
            if let Some(&pos) = self.index.get(&id) {
                self.features[pos].geometry = geometry;
                self.committed.push(id);
            }
        }
    }
}

impl FeatureStore for MemoryLayer {
    fn layer_info(&self) -> LayerInfo {
        self.info.clone()
    }

    fn features(&self) -> Result<Vec<Feature>> {
        Ok(self.features.clone())
    }

    fn get(&self, id: FeatureId) -> Result<Option<Geometry>> {
        Ok(self.index.get(&id).map(|&pos| self.features[pos].geometry.clone()))
    }

    fn select(&mut self, ids: &[FeatureId]) {
        self.selection = ids.to_vec();
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn selection(&self) -> &[FeatureId] {
        &self.selection
    }

    fn commit_pending(&mut self) -> Result<()> {
        if self.edits.is_some() {
            debug!(layer = %self.info.name, "committing pending edits");
            self.commit_edit()?;
        }
        Ok(())
    }

    fn begin_edit(&mut self) -> Result<()> {
        if self.edits.is_some() {
            return Err(StoreError::EditInProgress(self.info.name.clone()));
        }
        self.edits = Some(BTreeMap::new());
        Ok(())
    }

    fn write_geometry(&mut self, id: FeatureId, geometry: Geometry) -> Result<()> {
        if !self.index.contains_key(&id) {
            return Err(StoreError::UnknownFeature(id));
        }
        match self.edits.as_mut() {
            Some(edits) => {
                edits.insert(id, geometry);
                Ok(())
            }
            None => Err(StoreError::NoEditSession(self.info.name.clone())),
        }
    }

    fn commit_edit(&mut self) -> Result<()> {
        let edits = self
            .edits
            .take()
            .ok_or_else(|| StoreError::NoEditSession(self.info.name.clone()))?;
        debug!(layer = %self.info.name, writes = edits.len(), "committing edit session");
        self.apply(edits);
        Ok(())
    }

    fn rollback_edit(&mut self) {
        if let Some(edits) = self.edits.take() {
            debug!(layer = %self.info.name, discarded = edits.len(), "rolling back edit session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::GeometryFamily;
    use crate::geometry::{ring, Point, Polygon};

    fn square() -> Geometry {
        Geometry::Polygon(Polygon::new(ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)])))
    }

    #[test]
    fn push_assigns_sequential_ids() {
        let mut layer = MemoryLayer::polygons("a");
        assert_eq!(layer.push(square()), FeatureId(0));
        assert_eq!(layer.push(Geometry::Empty), FeatureId(1));
        assert_eq!(layer.len(), 2);
        let ids: Vec<FeatureId> = layer.features().unwrap().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![FeatureId(0), FeatureId(1)]);
    }

    #[test]
    fn push_after_explicit_insert_keeps_existing_feature() {
        let mut layer = MemoryLayer::polygons("a");
        layer.insert(Feature { id: FeatureId(1), geometry: square() });
        assert_eq!(layer.push(Geometry::Empty), FeatureId(2));
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.get(FeatureId(1)).unwrap(), Some(square()));

        layer.insert(Feature { id: FeatureId(10), geometry: Geometry::Empty });
        assert_eq!(layer.push(square()), FeatureId(11));
    }

    #[test]
    fn from_geometries_infers_family() {
        let polys = MemoryLayer::from_geometries("p", vec![square()]);
        assert!(polys.layer_info().is_polygonal());

        let points = MemoryLayer::from_geometries("q", vec![Geometry::Point(Point::new(0.0, 0.0))]);
        assert_eq!(points.layer_info().kind, LayerKind::Vector(GeometryFamily::Point));
    }

    #[test]
    fn writes_need_a_session() {
        let mut layer = MemoryLayer::polygons("a").with_geometry(square());
        assert!(matches!(
            layer.write_geometry(FeatureId(0), Geometry::Empty),
            Err(StoreError::NoEditSession(_))
        ));
    }

    #[test]
    fn writes_are_invisible_until_commit() {
        let mut layer = MemoryLayer::polygons("a").with_geometry(square());
        layer.begin_edit().unwrap();
        layer.write_geometry(FeatureId(0), Geometry::Empty).unwrap();
        assert_eq!(layer.get(FeatureId(0)).unwrap(), Some(square()));

        layer.commit_edit().unwrap();
        assert_eq!(layer.get(FeatureId(0)).unwrap(), Some(Geometry::Empty));
        assert_eq!(layer.committed_writes(), &[FeatureId(0)]);
    }

    #[test]
    fn commit_pending_flushes_open_session() {
        let mut layer = MemoryLayer::polygons("a").with_geometry(square());
        layer.begin_edit().unwrap();
        layer.write_geometry(FeatureId(0), Geometry::Empty).unwrap();
        layer.commit_pending().unwrap();
        assert!(!layer.is_editing());
        assert_eq!(layer.get(FeatureId(0)).unwrap(), Some(Geometry::Empty));

        // no session open: nothing to do
        layer.commit_pending().unwrap();
    }

    #[test]
    fn unknown_ids() {
        let mut layer = MemoryLayer::polygons("a");
        assert_eq!(layer.get(FeatureId(7)).unwrap(), None);
        layer.begin_edit().unwrap();
        assert!(matches!(
            layer.write_geometry(FeatureId(7), square()),
            Err(StoreError::UnknownFeature(FeatureId(7)))
        ));
    }

    #[test]
    fn selection_replaces_and_clears() {
        let mut layer = MemoryLayer::polygons("a");
        layer.select(&[FeatureId(1), FeatureId(3)]);
        assert_eq!(layer.selection(), &[FeatureId(1), FeatureId(3)]);
        layer.select(&[FeatureId(2)]);
        assert_eq!(layer.selection(), &[FeatureId(2)]);
        layer.clear_selection();
        assert!(layer.selection().is_empty());
    }
}
