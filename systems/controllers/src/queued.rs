//! Controller fed by actions injected between turns.

use std::collections::VecDeque;

use drone_field_core::{Action, Controller, Observation};

/// Interactive controller that replays externally queued actions.
///
/// Each decision consumes the oldest queued action; an empty queue waits.
#[derive(Clone, Debug)]
pub struct QueuedController {
    name: String,
    queue: VecDeque<Action>,
}

impl QueuedController {
    /// Creates a controller with an empty queue.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue: VecDeque::new(),
        }
    }

    /// Number of actions waiting to be consumed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Controller for QueuedController {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&mut self, _observation: &Observation) -> Option<Action> {
        Some(self.queue.pop_front().unwrap_or_else(Action::wait))
    }

    fn requires_interaction(&self) -> bool {
        true
    }

    fn has_pending_actions(&self) -> bool {
        !self.queue.is_empty()
    }

    fn enqueue(&mut self, action: Action) -> bool {
        self.queue.push_back(action);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drone_field_core::{ActionKind, CellCoord, Direction, ItemStore};

    fn blank_observation() -> Observation {
        Observation {
            turn: 0,
            time_remaining: Some(3),
            position: CellCoord::new(0, 0),
            inventory: ItemStore::new(),
            tiles: Default::default(),
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn queued_actions_are_consumed_in_order() {
        let mut pilot = QueuedController::new("Pilot");
        assert!(pilot.requires_interaction());
        assert!(!pilot.has_pending_actions());

        assert!(pilot.enqueue(Action::step(Direction::West)));
        assert!(pilot.enqueue(Action::harvest()));
        assert_eq!(pilot.pending(), 2);

        let view = blank_observation();
        assert_eq!(pilot.decide(&view), Some(Action::step(Direction::West)));
        assert_eq!(pilot.decide(&view), Some(Action::harvest()));
        assert!(!pilot.has_pending_actions());
        assert_eq!(pilot.decide(&view).map(|action| action.kind), Some(ActionKind::Wait));
    }
}
