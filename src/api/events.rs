use log::{debug, warn};
use rocket::{
    response::stream::{Event, EventStream},
    tokio::{select, sync::broadcast::error::RecvError},
    Route, Shutdown, State,
};

use crate::error::Result;
use crate::logging::RequestId;
use crate::model::{
    election::ElectionPhase,
    notification::{self, Notification},
    registry::{ElectionId, ElectionRegistry},
};

pub fn routes() -> Vec<Route> {
    routes![all_events, election_events]
}

fn notification_event(notification: &Notification) -> Event {
    Event::json(notification)
        .event("notification")
        .id(format!("{}:{}", notification.election_id, notification.sequence))
}

fn lagged_event(missed: u64) -> Event {
    Event::data(missed.to_string()).event("lagged")
}

/// Live notifications from every election. A subscriber that falls too far
/// behind receives a `lagged` event with the number of notifications it
/// missed, and should catch up from the journals.
#[get("/events")]
fn all_events(
    registry: &State<ElectionRegistry>,
    request: &RequestId,
    mut shutdown: Shutdown,
) -> EventStream![] {
    let mut receiver = registry.subscribe();
    let request = *request;
    debug!("{request} subscribed to all elections");

    EventStream! {
        loop {
            let received = select! {
                biased;
                received = receiver.recv() => received,
                _ = &mut shutdown => break,
            };
            match received {
                Ok(notification) => yield notification_event(&notification),
                Err(RecvError::Lagged(missed)) => {
                    warn!("{request} event subscriber lagged by {missed}");
                    yield lagged_event(missed);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}

/// Where a subscriber to one election has got to.
///
/// The same notification can arrive from both the journal and the live
/// channel; the cursor lets each through once, in sequence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ElectionCursor {
    election_id: ElectionId,
    last_sequence: u64,
}

impl ElectionCursor {
    fn new(election_id: ElectionId, since: u64) -> Self {
        Self {
            election_id,
            last_sequence: since,
        }
    }

    /// Whether `notification` is new to this subscriber. Advances past it if so.
    fn advance(&mut self, notification: &Notification) -> bool {
        if notification.election_id != self.election_id
            || notification.sequence <= self.last_sequence
        {
            return false;
        }
        self.last_sequence = notification.sequence;
        true
    }
}

/// One election's journal after `since`, followed by its live notifications.
/// The stream ends once the election has ended.
#[get("/elections/<election_id>/events?<since>")]
fn election_events(
    election_id: ElectionId,
    since: Option<u64>,
    registry: &State<ElectionRegistry>,
    request: &RequestId,
    mut shutdown: Shutdown,
) -> Result<EventStream![]> {
    let election = registry.get(election_id)?;
    // Subscribe first, then read the phase, then the journal: nothing can
    // fall in between, and an ended election's journal is complete.
    let mut receiver = registry.subscribe();
    let ended = election.phase() == ElectionPhase::Ended;
    let backlog = election.journal(since.unwrap_or(0));
    let request = *request;
    debug!(
        "{request} subscribed to election {election_id}, replaying {}",
        backlog.len()
    );

    Ok(EventStream! {
        let mut cursor = ElectionCursor::new(election_id, since.unwrap_or(0));
        for notification in backlog {
            if cursor.advance(&notification) {
                yield notification_event(&notification);
            }
        }

        while !ended {
            let received = select! {
                biased;
                received = receiver.recv() => received,
                _ = &mut shutdown => break,
            };
            match received {
                Ok(notification) => {
                    if !cursor.advance(&notification) {
                        continue;
                    }
                    yield notification_event(&notification);
                    if is_final(&notification) {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!("{request} election {election_id} subscriber lagged by {missed}");
                    yield lagged_event(missed);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn is_final(notification: &Notification) -> bool {
    matches!(notification.event, notification::Event::ElectionEnded { .. })
}
