//! Push-notification topic management.
//!
//! Every homeroom has a topic named `"{grade}-{class}"`. An install should be
//! subscribed to exactly one of the 33 topics, the one matching the selected
//! class. Requests are fire-and-forget: each runs as its own tokio task, failures
//! are logged and never retried, and the returned [`SubscriptionTask`] only
//! exists so a caller (usually a test) can wait for the outcome.

mod broker;
mod error;

pub use broker::{IidTopicBroker, MessagingConfig, TopicBroker, UnconfiguredBroker, IID_ENDPOINT};
pub use error::MessagingError;

use crate::schedule::GradeClass;
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Direction of a topic request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicAction {
    Subscribe,
    Unsubscribe,
}

impl fmt::Display for TopicAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicAction::Subscribe => write!(f, "subscribe"),
            TopicAction::Unsubscribe => write!(f, "unsubscribe"),
        }
    }
}

/// Result of one topic request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicOutcome {
    pub action: TopicAction,
    pub topic: String,
    pub result: Result<(), MessagingError>,
}

impl TopicOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// A topic request that was handed to the runtime, or the reason it was not.
type PendingRequest = (
    TopicAction,
    String,
    Result<JoinHandle<Result<(), MessagingError>>, MessagingError>,
);

/// Handle over a batch of in-flight topic requests.
///
/// Dropping it does not cancel anything.
#[derive(Debug)]
pub struct SubscriptionTask {
    handles: Vec<PendingRequest>,
}

impl SubscriptionTask {
    /// Number of requests in this batch.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits for every request and returns their outcomes in issue order.
    pub async fn wait(self) -> Vec<TopicOutcome> {
        join_all(self.handles.into_iter().map(|(action, topic, handle)| async move {
            let result = match handle {
                Ok(handle) => handle.await.map_err(MessagingError::from).and_then(|r| r),
                Err(e) => Err(e),
            };
            TopicOutcome {
                action,
                topic,
                result,
            }
        }))
        .await
    }
}

/// Keeps the install's topic subscription in line with the selected class.
#[derive(Clone)]
pub struct TopicManager {
    broker: Arc<dyn TopicBroker>,
}

impl TopicManager {
    pub fn new(broker: Arc<dyn TopicBroker>) -> Self {
        Self { broker }
    }

    /// Moves the subscription from `old` to `new`.
    ///
    /// The unsubscribe (skipped when there is no old class or it equals the
    /// new one) and the subscribe are independent and unordered.
    pub fn update_subscription(&self, old: Option<&GradeClass>, new: &GradeClass) -> SubscriptionTask {
        let mut handles = Vec::with_capacity(2);
        let new_topic = new.topic();

        if let Some(old) = old.filter(|old| *old != new) {
            handles.push(self.spawn(TopicAction::Unsubscribe, old.topic()));
        }
        handles.push(self.spawn(TopicAction::Subscribe, new_topic));

        SubscriptionTask { handles }
    }

    /// Unsubscribes every homeroom topic except `current`, then subscribes
    /// `current`.
    ///
    /// Run at startup to clean up after stale installs or topic renames.
    pub fn sweep(&self, current: &GradeClass) -> SubscriptionTask {
        info!(current = %current, "Sweeping notification topics");

        let mut handles: Vec<_> = GradeClass::all()
            .filter(|gc| gc != current)
            .map(|gc| self.spawn(TopicAction::Unsubscribe, gc.topic()))
            .collect();
        handles.push(self.spawn(TopicAction::Subscribe, current.topic()));

        SubscriptionTask { handles }
    }

    /// Subscribes the topic of `current` (notifications switched on).
    pub fn subscribe_current(&self, current: &GradeClass) -> SubscriptionTask {
        SubscriptionTask {
            handles: vec![self.spawn(TopicAction::Subscribe, current.topic())],
        }
    }

    /// Unsubscribes the topic of `current` (notifications switched off).
    pub fn unsubscribe_current(&self, current: &GradeClass) -> SubscriptionTask {
        SubscriptionTask {
            handles: vec![self.spawn(TopicAction::Unsubscribe, current.topic())],
        }
    }

    /// Starts one request on the current tokio runtime.
    ///
    /// Outside a runtime nothing is sent and the request resolves to
    /// [`MessagingError::Task`].
    fn spawn(&self, action: TopicAction, topic: String) -> PendingRequest {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(topic = %topic, action = %action, error = %e, "No async runtime, topic request dropped");
                let err = MessagingError::Task {
                    message: e.to_string(),
                };
                return (action, topic, Err(err));
            }
        };

        let broker = self.broker.clone();
        let task_topic = topic.clone();

        let handle = runtime.spawn(async move {
            let result = match action {
                TopicAction::Subscribe => broker.subscribe(&task_topic).await,
                TopicAction::Unsubscribe => broker.unsubscribe(&task_topic).await,
            };

            match &result {
                Ok(()) => info!(topic = %task_topic, action = %action, "Topic request succeeded"),
                Err(e) => warn!(topic = %task_topic, action = %action, error = %e, "Topic request failed"),
            }

            result
        });

        (action, topic, Ok(handle))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingBroker;
    use super::*;

    fn gc(grade: u8, class: u8) -> GradeClass {
        GradeClass::new(grade, class).unwrap()
    }

    fn manager() -> (Arc<RecordingBroker>, TopicManager) {
        let broker = Arc::new(RecordingBroker::default());
        (broker.clone(), TopicManager::new(broker))
    }

    #[tokio::test]
    async fn test_class_change_moves_topic() {
        let (broker, topics) = manager();

        let outcomes = topics
            .update_subscription(Some(&gc(1, 1)), &gc(2, 3))
            .wait()
            .await;

        assert!(outcomes.iter().all(TopicOutcome::succeeded));
        let mut calls = broker.calls();
        calls.sort_by_key(|(action, _)| *action == TopicAction::Subscribe);
        assert_eq!(
            calls,
            vec![
                (TopicAction::Unsubscribe, "1-1".to_string()),
                (TopicAction::Subscribe, "2-3".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_same_class_only_subscribes() {
        let (broker, topics) = manager();

        let task = topics.update_subscription(Some(&gc(2, 3)), &gc(2, 3));
        assert_eq!(task.len(), 1);
        task.wait().await;

        assert_eq!(broker.calls(), vec![(TopicAction::Subscribe, "2-3".to_string())]);
    }

    #[tokio::test]
    async fn test_first_selection_only_subscribes() {
        let (broker, topics) = manager();
        topics.update_subscription(None, &gc(3, 11)).wait().await;
        assert_eq!(broker.calls(), vec![(TopicAction::Subscribe, "3-11".to_string())]);
    }

    #[tokio::test]
    async fn test_sweep_covers_all_other_topics() {
        let (broker, topics) = manager();

        let outcomes = topics.sweep(&gc(2, 3)).wait().await;
        assert_eq!(outcomes.len(), 33);

        let calls = broker.calls();
        let unsubscribed: Vec<_> = calls
            .iter()
            .filter(|(action, _)| *action == TopicAction::Unsubscribe)
            .map(|(_, topic)| topic.as_str())
            .collect();
        let subscribed: Vec<_> = calls
            .iter()
            .filter(|(action, _)| *action == TopicAction::Subscribe)
            .map(|(_, topic)| topic.as_str())
            .collect();

        assert_eq!(unsubscribed.len(), 32);
        assert!(!unsubscribed.contains(&"2-3"));
        assert!(unsubscribed.contains(&"1-1"));
        assert!(unsubscribed.contains(&"3-11"));
        assert_eq!(subscribed, vec!["2-3"]);
    }

    #[tokio::test]
    async fn test_failures_are_reported_not_raised() {
        let broker = Arc::new(RecordingBroker {
            failing_topic: Some("1-1".to_string()),
            ..Default::default()
        });
        let topics = TopicManager::new(broker.clone());

        let outcomes = topics
            .update_subscription(Some(&gc(1, 1)), &gc(1, 2))
            .wait()
            .await;

        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].succeeded());
        assert_eq!(outcomes[0].action, TopicAction::Unsubscribe);
        assert!(outcomes[1].succeeded());
    }

    #[test]
    fn test_requests_outside_runtime_fail_quietly() {
        let (broker, topics) = manager();

        let task = topics.update_subscription(Some(&gc(1, 1)), &gc(2, 3));
        let outcomes = futures::executor::block_on(task.wait());

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o.result, Err(MessagingError::Task { .. }))));
        assert!(broker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_helpers() {
        let (broker, topics) = manager();
        topics.subscribe_current(&gc(1, 5)).wait().await;
        topics.unsubscribe_current(&gc(1, 5)).wait().await;

        assert_eq!(
            broker.calls(),
            vec![
                (TopicAction::Subscribe, "1-5".to_string()),
                (TopicAction::Unsubscribe, "1-5".to_string()),
            ]
        );
    }
}
