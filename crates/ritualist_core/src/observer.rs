use crate::service::BoardSnapshot;

/// Receives the fresh snapshot after every change to the board. Rendering
/// layers implement this to redraw.
pub trait BoardObserver: Send + Sync {
    fn board_changed(&self, snapshot: &BoardSnapshot);
}

impl<F> BoardObserver for F
where
    F: Fn(&BoardSnapshot) + Send + Sync,
{
    fn board_changed(&self, snapshot: &BoardSnapshot) {
        self(snapshot)
    }
}
