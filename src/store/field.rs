//! Observable value cell.

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A value that can be read at any time and observed for changes.
///
/// New observers see the current value first and then every later write
/// (last write wins; intermediate values may be coalesced for slow readers).
#[derive(Debug)]
pub struct ObservableField<T> {
    tx: watch::Sender<T>,
}

impl<T> ObservableField<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Receiver positioned at the current value.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Stream yielding the current value immediately, then every change.
    pub fn stream(&self) -> WatchStream<T> {
        WatchStream::new(self.tx.subscribe())
    }

}

impl<T> ObservableField<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Store `value`, notifying observers only if it differs.
    pub(crate) fn set(&self, value: T) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[test]
    fn test_get_and_set() {
        let field = ObservableField::new(None::<f64>);
        assert_eq!(field.get(), None);
        field.set(Some(12.5));
        assert_eq!(field.get(), Some(12.5));
    }

    #[test]
    fn test_set_without_observers_keeps_value() {
        let field = ObservableField::new(String::new());
        field.set("boom".to_string());
        assert_eq!(field.get(), "boom");
    }

    #[test]
    fn test_set_same_value_does_not_notify() {
        let field = ObservableField::new(None::<String>);
        let mut rx = field.subscribe();

        assert!(!field.set(None));
        assert!(!rx.has_changed().unwrap());

        assert!(field.set(Some("title".to_string())));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        assert!(!field.set(Some("title".to_string())));
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_stream_replays_latest_then_changes() {
        let field = ObservableField::new(1u32);
        field.set(2);

        let mut stream = field.stream();
        assert_eq!(stream.next().await, Some(2));

        field.set(3);
        assert_eq!(stream.next().await, Some(3));
    }

    #[tokio::test]
    async fn test_subscribe_sees_current_value_and_changes() {
        let field = ObservableField::new(false);
        let mut rx = field.subscribe();
        assert!(!*rx.borrow());

        field.set(true);
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
    }
}
