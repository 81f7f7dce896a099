use std::iter::Peekable;

use log::trace;

use crate::raw::RawParticle;

/// Group a stream of particle entries into events
///
/// Entries belonging to the same event have to be adjacent. A new event
/// starts whenever the event number changes. After the input is
/// exhausted, the pending event is emitted as well.
///
/// Read errors are passed on unchanged, and no further events are
/// produced after the first error.
pub struct EventGrouper<I: Iterator> {
    input: Peekable<I>,
    failed: bool,
}

impl<I, E> EventGrouper<I>
where
    I: Iterator<Item = Result<RawParticle, E>>,
{
    pub fn new(input: I) -> Self {
        Self {
            input: input.peekable(),
            failed: false,
        }
    }
}

impl<I, E> Iterator for EventGrouper<I>
where
    I: Iterator<Item = Result<RawParticle, E>>,
{
    type Item = Result<Vec<RawParticle>, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let first = match self.input.next()? {
            Ok(first) => first,
            Err(err) => {
                self.failed = true;
                return Some(Err(err));
            }
        };
        let event = first.event;
        let mut group = vec![first];
        while let Some(Ok(next)) = self.input.peek() {
            if next.event != event {
                break;
            }
            if let Some(Ok(next)) = self.input.next() {
                group.push(next)
            }
        }
        // An error directly after the current group is reported
        // in the next call
        trace!("Event {event} with {} entries", group.len());
        Some(Ok(group))
    }
}

/// Extension trait to group particle streams into events
pub trait GroupEvents: Iterator + Sized {
    fn group_events(self) -> EventGrouper<Self>;
}

impl<I, E> GroupEvents for I
where
    I: Iterator<Item = Result<RawParticle, E>>,
{
    fn group_events(self) -> EventGrouper<Self> {
        EventGrouper::new(self)
    }
}
