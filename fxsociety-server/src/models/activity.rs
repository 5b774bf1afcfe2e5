//! Customer activity log vocabulary

use std::fmt;

/// Kind of event recorded in a customer's activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    OrderCreated,
    OrderStatusUpdated,
    TicketCreated,
    TicketUpdated,
    NoteAdded,
    TagAdded,
    TagRemoved,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OrderCreated => "order_created",
            Self::OrderStatusUpdated => "order_status_updated",
            Self::TicketCreated => "ticket_created",
            Self::TicketUpdated => "ticket_updated",
            Self::NoteAdded => "note_added",
            Self::TagAdded => "tag_added",
            Self::TagRemoved => "tag_removed",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
