use crate::features::FeatureCollection;

/// The map's vector-data source. The placement machine writes the full feature
/// collection here after every accepted transition, and nowhere else.
pub trait MapLayer: Send {
    fn set_data(&mut self, features: &FeatureCollection);
}

/// Keeps every snapshot it receives. Useful for headless front-ends and tests.
#[derive(Debug, Default)]
pub struct RecordingLayer {
    snapshots: Vec<FeatureCollection>,
}

impl RecordingLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> &[FeatureCollection] {
        &self.snapshots
    }

    pub fn latest(&self) -> Option<&FeatureCollection> {
        self.snapshots.last()
    }

    pub fn redraws(&self) -> usize {
        self.snapshots.len()
    }
}

impl MapLayer for RecordingLayer {
    fn set_data(&mut self, features: &FeatureCollection) {
        self.snapshots.push(features.clone());
    }
}

impl<L: MapLayer + ?Sized> MapLayer for Box<L> {
    fn set_data(&mut self, features: &FeatureCollection) {
        (**self).set_data(features)
    }
}
