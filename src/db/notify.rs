//! Change notification
//!
//! Writers publish a [`DataChange`] after a successful write; readers
//! subscribe and re-run their query when something they display changed.

use serde::Serialize;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// What part of the data changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataChange {
    Foods,
    Diets,
    DietItems { diet_id: i64 },
    Profile,
}

impl DataChange {
    /// Whether a view of the given diet has to be refreshed
    pub fn affects_diet(&self, diet_id: i64) -> bool {
        match self {
            DataChange::DietItems { diet_id: changed } => *changed == diet_id,
            // Diet views fall back to the profile's calorie goal
            DataChange::Diets | DataChange::Foods | DataChange::Profile => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<DataChange>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DataChange> {
        self.sender.subscribe()
    }

    /// Publish a change; returns how many subscribers were notified
    pub fn publish(&self, change: DataChange) -> usize {
        match self.sender.send(change) {
            Ok(n) => {
                tracing::debug!(?change, subscribers = n, "published data change");
                n
            }
            // No subscribers is not an error
            Err(_) => 0,
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let notifier = ChangeNotifier::new();
        assert_eq!(notifier.publish(DataChange::Foods), 0);
    }

    #[test]
    fn test_subscriber_receives_in_order() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.publish(DataChange::Diets);
        notifier.publish(DataChange::DietItems { diet_id: 3 });

        assert_eq!(rx.try_recv().unwrap(), DataChange::Diets);
        assert_eq!(rx.try_recv().unwrap(), DataChange::DietItems { diet_id: 3 });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_affects_diet() {
        assert!(DataChange::DietItems { diet_id: 1 }.affects_diet(1));
        assert!(!DataChange::DietItems { diet_id: 2 }.affects_diet(1));
        assert!(DataChange::Diets.affects_diet(1));
        assert!(DataChange::Profile.affects_diet(1));
    }
}
