//! Status observers for transfer runs

use tokio::sync::mpsc;

use crate::domain::entities::TransferStatus;

/// Receives every status update a transfer run publishes, in order
pub trait TransferObserver {
    fn on_status(&mut self, status: &TransferStatus);
}

impl TransferObserver for Vec<TransferStatus> {
    fn on_status(&mut self, status: &TransferStatus) {
        self.push(status.clone());
    }
}

/// Forwards updates to an async consumer, e.g. a UI task
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<TransferStatus>,
}

impl ChannelObserver {
    pub fn new(sender: mpsc::UnboundedSender<TransferStatus>) -> Self {
        Self { sender }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TransferStatus>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl TransferObserver for ChannelObserver {
    fn on_status(&mut self, status: &TransferStatus) {
        if self.sender.send(status.clone()).is_err() {
            log::debug!("Status receiver dropped, update for {} discarded", status.asset_address);
        }
    }
}

/// Publishes each update to several observers in turn
pub struct FanoutObserver<'a> {
    observers: Vec<&'a mut dyn TransferObserver>,
}

impl<'a> FanoutObserver<'a> {
    pub fn new(observers: Vec<&'a mut dyn TransferObserver>) -> Self {
        Self { observers }
    }
}

impl TransferObserver for FanoutObserver<'_> {
    fn on_status(&mut self, status: &TransferStatus) {
        for observer in self.observers.iter_mut() {
            observer.on_status(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_observer_forwards_in_order() {
        let (mut observer, mut receiver) = ChannelObserver::channel();
        observer.on_status(&TransferStatus::pending("0xabc"));
        observer.on_status(&TransferStatus::transferring("0xabc"));
        drop(observer);

        assert_eq!(receiver.recv().await.map(|s| s.state), Some(crate::domain::TransferState::Pending));
        assert_eq!(receiver.recv().await.map(|s| s.state), Some(crate::domain::TransferState::Transferring));
        assert!(receiver.recv().await.is_none());
    }

    #[test]
    fn test_channel_observer_survives_dropped_receiver() {
        let (mut observer, receiver) = ChannelObserver::channel();
        drop(receiver);
        observer.on_status(&TransferStatus::pending("0xabc"));
    }

    #[test]
    fn test_fanout_reaches_every_observer() {
        let mut first: Vec<TransferStatus> = Vec::new();
        let mut second: Vec<TransferStatus> = Vec::new();
        {
            let observers: Vec<&mut dyn TransferObserver> = vec![&mut first, &mut second];
            let mut fanout = FanoutObserver::new(observers);
            fanout.on_status(&TransferStatus::pending("0xabc"));
        }
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }
}
