//! Map surface for the terminal front-end

use parking_lot::Mutex;
use pin_placement::{FeatureCollection, MapLayer};
use std::sync::Arc;
use tracing::debug;

/// Keeps the latest feature collection for the `map` command and logs each
/// redraw. Clones share the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct TerminalLayer {
    latest: Arc<Mutex<FeatureCollection>>,
}

impl TerminalLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> FeatureCollection {
        self.latest.lock().clone()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&*self.latest.lock())
    }
}

impl MapLayer for TerminalLayer {
    fn set_data(&mut self, features: &FeatureCollection) {
        debug!(
            points = features.points().count(),
            lines = features.lines().count(),
            "map layer redrawn"
        );
        *self.latest.lock() = features.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pin_placement::{Feature, GeoPoint};

    #[test]
    fn test_clones_share_snapshot() {
        let layer = TerminalLayer::new();
        let mut writer = layer.clone();

        let mut fc = FeatureCollection::new();
        fc.push(Feature::line(
            &GeoPoint::new(2.35, 48.85).unwrap(),
            &GeoPoint::new(139.69, 35.68).unwrap(),
        ));
        writer.set_data(&fc);

        assert_eq!(layer.snapshot().len(), 1);
        assert!(layer.to_json().unwrap().contains("LineString"));
    }
}
