use super::MapEvent;
use crate::point::LatLng;
use crossbeam_channel::Sender;
use tracing::debug;

/// Turns map clicks into point-creation requests.
///
/// Only exists while the engine is live and editable; it never touches the
/// widget or the point collection itself.
#[derive(Debug)]
pub struct ClickCapture {
    events: Sender<MapEvent>,
}

impl ClickCapture {
    pub fn new(events: Sender<MapEvent>) -> Self {
        Self { events }
    }

    /// Emit a creation request for `at`; false if nobody is listening
    pub fn capture(&self, at: LatLng) -> bool {
        debug!(lat = at.lat, lng = at.lng, "point creation requested");
        self.events
            .send(MapEvent::PointCreationRequested(at))
            .is_ok()
    }
}
