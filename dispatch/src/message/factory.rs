//! `MessageFactory` collaborator: the only message kind the dispatcher
//! constructs itself is a CANCEL, when a slot goes stale because its
//! block completed elsewhere.

use super::BtMessage;

pub trait MessageFactory: std::fmt::Debug {
    fn create_cancel_message(&self, index: u32, begin: u32, length: u32) -> BtMessage;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMessageFactory;

impl MessageFactory for DefaultMessageFactory {
    fn create_cancel_message(&self, index: u32, begin: u32, length: u32) -> BtMessage {
        BtMessage::cancel(index, begin, length)
    }
}
