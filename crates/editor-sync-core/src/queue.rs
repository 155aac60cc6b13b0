//! Unbounded multi-producer, single-consumer event queue.
//!
//! Unlike `tokio::sync::mpsc`, delivery order is selectable: with
//! `QueueOrder::Lifo` the most recently pushed event is popped first.

use crate::config::QueueOrder;
use crate::event::ChangeEvent;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

struct State {
    events: VecDeque<ChangeEvent>,
    senders: usize,
}

struct Shared {
    order: QueueOrder,
    state: Mutex<State>,
    notify: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Create a queue, returning its producer and consumer halves.
pub fn event_queue(order: QueueOrder) -> (EventSender, EventReceiver) {
    let shared = Arc::new(Shared {
        order,
        state: Mutex::new(State {
            events: VecDeque::new(),
            senders: 1,
        }),
        notify: Notify::new(),
    });
    (
        EventSender {
            shared: Arc::clone(&shared),
        },
        EventReceiver { shared },
    )
}

/// Producer half. Cheap to clone; usable from non-async threads.
pub struct EventSender {
    shared: Arc<Shared>,
}

impl EventSender {
    /// Enqueue an event. Never blocks.
    pub fn push(&self, event: ChangeEvent) {
        self.shared.lock().events.push_back(event);
        self.shared.notify.notify_one();
    }
}

impl Clone for EventSender {
    fn clone(&self) -> Self {
        self.shared.lock().senders += 1;
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Drop for EventSender {
    fn drop(&mut self) {
        self.shared.lock().senders -= 1;
        self.shared.notify.notify_one();
    }
}

/// Consumer half.
pub struct EventReceiver {
    shared: Arc<Shared>,
}

impl EventReceiver {
    /// Wait for the next event.
    ///
    /// Returns `None` once the queue is empty and every sender is gone.
    pub async fn pop(&mut self) -> Option<ChangeEvent> {
        loop {
            if let Some(event) = self.try_pop() {
                return Some(event);
            }
            if self.shared.lock().senders == 0 {
                return None;
            }
            // notify_one stores a permit when nobody is waiting, so a push
            // between the check above and this await is not lost.
            self.shared.notify.notified().await;
        }
    }

    /// Take the next event without waiting.
    pub fn try_pop(&mut self) -> Option<ChangeEvent> {
        let mut state = self.shared.lock();
        match self.shared.order {
            QueueOrder::Lifo => state.events.pop_back(),
            QueueOrder::Fifo => state.events.pop_front(),
        }
    }

    /// Number of events waiting.
    pub fn len(&self) -> usize {
        self.shared.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Origin;
    use std::time::Duration;

    fn event(index: usize) -> ChangeEvent {
        ChangeEvent::now(Origin::LocalFile, index)
    }

    #[tokio::test]
    async fn test_lifo_delivers_newest_first() {
        let (tx, mut rx) = event_queue(QueueOrder::Lifo);
        tx.push(event(0));
        tx.push(event(1));
        tx.push(event(2));

        assert_eq!(rx.pop().await.unwrap().index(), 2);
        assert_eq!(rx.pop().await.unwrap().index(), 1);
        assert_eq!(rx.pop().await.unwrap().index(), 0);
    }

    #[tokio::test]
    async fn test_fifo_delivers_oldest_first() {
        let (tx, mut rx) = event_queue(QueueOrder::Fifo);
        tx.push(event(0));
        tx.push(event(1));

        assert_eq!(rx.pop().await.unwrap().index(), 0);
        assert_eq!(rx.pop().await.unwrap().index(), 1);
    }

    #[tokio::test]
    async fn test_pop_waits_for_push_from_another_thread() {
        let (tx, mut rx) = event_queue(QueueOrder::Lifo);

        let producer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            tx.push(event(7));
        });

        let received = tokio::time::timeout(Duration::from_secs(5), rx.pop())
            .await
            .expect("Timeout waiting for event");
        assert_eq!(received.unwrap().index(), 7);
        producer.join().unwrap();
    }

    #[tokio::test]
    async fn test_pop_returns_none_after_senders_dropped() {
        let (tx, mut rx) = event_queue(QueueOrder::Lifo);
        let tx2 = tx.clone();
        tx2.push(event(3));
        drop(tx);
        drop(tx2);

        assert_eq!(rx.pop().await.unwrap().index(), 3);
        assert!(rx.pop().await.is_none());
    }

    #[test]
    fn test_len_tracks_pending_events() {
        let (tx, mut rx) = event_queue(QueueOrder::Fifo);
        assert!(rx.is_empty());
        tx.push(event(0));
        tx.push(event(0));
        assert_eq!(rx.len(), 2);
        rx.try_pop();
        assert_eq!(rx.len(), 1);
    }
}
