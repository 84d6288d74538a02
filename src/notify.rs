//! Best-effort notification fan-out.
//!
//! Recipients are tried independently; a failed delivery is logged and
//! dropped, never retried, and never aborts the remaining sends.

use std::sync::Arc;

use crate::telegram::Outbound;

pub struct Notifier {
    outbound: Arc<dyn Outbound>,
}

impl Notifier {
    pub fn new(outbound: Arc<dyn Outbound>) -> Self {
        Self { outbound }
    }

    /// Fan a message out to every operator. Returns how many deliveries
    /// succeeded.
    pub async fn notify_operators(
        &self,
        operators: &[i64],
        text: &str,
        keyboard: Option<serde_json::Value>,
    ) -> usize {
        let mut delivered = 0;
        for &chat_id in operators {
            match self.outbound.send(chat_id, text, keyboard.clone()).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(recipient = chat_id, error = %e, "Operator notification failed");
                }
            }
        }
        delivered
    }

    /// Send a single owner notification. Returns whether it was delivered.
    pub async fn notify_user(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<serde_json::Value>,
    ) -> bool {
        match self.outbound.send(chat_id, text, keyboard).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(recipient = chat_id, error = %e, "Owner notification failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChannelError;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Outbound fake that fails for a chosen set of recipients.
    struct FlakyOutbound {
        failing: Vec<i64>,
        sent: Mutex<Vec<i64>>,
    }

    impl FlakyOutbound {
        fn new(failing: Vec<i64>) -> Self {
            Self {
                failing,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Outbound for FlakyOutbound {
        async fn send(
            &self,
            chat_id: i64,
            _text: &str,
            _keyboard: Option<serde_json::Value>,
        ) -> Result<(), ChannelError> {
            if self.failing.contains(&chat_id) {
                return Err(ChannelError::SendFailed {
                    chat_id,
                    reason: "blocked".into(),
                });
            }
            self.sent.lock().await.push(chat_id);
            Ok(())
        }

        async fn clear_buttons(
            &self,
            _message: crate::telegram::MessageRef,
        ) -> Result<(), ChannelError> {
            Ok(())
        }

        async fn answer_callback(
            &self,
            _callback_id: &str,
            _text: Option<&str>,
        ) -> Result<(), ChannelError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_rest() {
        let outbound = Arc::new(FlakyOutbound::new(vec![20]));
        let notifier = Notifier::new(outbound.clone());

        let delivered = notifier.notify_operators(&[10, 20, 30], "hi", None).await;
        assert_eq!(delivered, 2);
        assert_eq!(*outbound.sent.lock().await, vec![10, 30]);
    }

    #[tokio::test]
    async fn all_failures_deliver_zero() {
        let outbound = Arc::new(FlakyOutbound::new(vec![10, 20]));
        let notifier = Notifier::new(outbound);
        assert_eq!(notifier.notify_operators(&[10, 20], "hi", None).await, 0);
    }

    #[tokio::test]
    async fn owner_notification_reports_delivery() {
        let outbound = Arc::new(FlakyOutbound::new(vec![5]));
        let notifier = Notifier::new(outbound);
        assert!(notifier.notify_user(6, "hi", None).await);
        assert!(!notifier.notify_user(5, "hi", None).await);
    }
}
