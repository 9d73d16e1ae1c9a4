// Backed by a VecDeque: every operation here is either head/tail
// relative or a full linear scan, no random access needed.

use std::collections::VecDeque;

use crate::events::BtEvent;
use crate::message::BtMessage;

#[derive(Debug, Default)]
pub struct MessageQueue {
    messages: VecDeque<BtMessage>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, mut message: BtMessage) {
        message.on_queued();
        self.messages.push_back(message);
    }

    pub fn front(&self) -> Option<&BtMessage> {
        self.messages.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut BtMessage> {
        self.messages.front_mut()
    }

    pub fn pop_front(&mut self) -> Option<BtMessage> {
        self.messages.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    // Never removes anything during iteration; handlers mutate only
    // their own message state.
    pub fn broadcast(&mut self, event: &BtEvent) {
        for message in self.messages.iter_mut() {
            message.handle_event(event);
        }
    }

    // Visits messages front to back, asking f what to do with each.
    // RetainAndStop keeps a message at the head and ends the sweep,
    // leaving every untouched message behind it exactly where it was.
    pub fn drain_while<F, E>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&mut BtMessage) -> Result<DrainAction, E>,
    {
        let mut kept = VecDeque::new();
        while let Some(mut message) = self.messages.pop_front() {
            match f(&mut message)? {
                DrainAction::Remove => {}
                DrainAction::Retain => kept.push_back(message),
                DrainAction::RetainAndStop => {
                    kept.push_back(message);
                    break;
                }
            }
        }
        for message in kept.into_iter().rev() {
            self.messages.push_front(message);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainAction {
    Remove,
    Retain,
    RetainAndStop,
}
