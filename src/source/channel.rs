//! Channel-based data source.
//!
//! Updates are pushed by hand through a [`ChannelHandle`] and requests are
//! collected on the other side. Useful for tests and for embedding the
//! dashboard next to an existing data pipeline.

use tokio::sync::mpsc;

use super::{DataSource, Request, Update};

/// A data source fed through in-memory channels.
///
/// # Example
///
/// ```
/// use crewwatch::{ChannelSource, DataSource, Update, QueryKey};
///
/// let (handle, mut source) = ChannelSource::create("embedded");
/// handle.publish(Update::Loading(QueryKey::Profiles));
/// assert!(matches!(source.poll(), Some(Update::Loading(QueryKey::Profiles))));
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    updates: mpsc::UnboundedReceiver<Update>,
    requests: mpsc::UnboundedSender<Request>,
    description: String,
    disconnected: bool,
}

/// The producer side of a [`ChannelSource`].
#[derive(Debug)]
pub struct ChannelHandle {
    updates: mpsc::UnboundedSender<Update>,
    requests: mpsc::UnboundedReceiver<Request>,
}

impl ChannelHandle {
    /// Push an update to the source. Returns false once the source is gone.
    pub fn publish(&self, update: Update) -> bool {
        self.updates.send(update).is_ok()
    }

    /// Take every request queued so far.
    pub fn drain_requests(&mut self) -> Vec<Request> {
        let mut requests = Vec::new();
        while let Ok(request) = self.requests.try_recv() {
            requests.push(request);
        }
        requests
    }
}

impl ChannelSource {
    /// Create a connected handle and source.
    pub fn create(source_description: &str) -> (ChannelHandle, Self) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let source = Self {
            updates: update_rx,
            requests: request_tx,
            description: format!("channel: {}", source_description),
            disconnected: false,
        };
        let handle = ChannelHandle {
            updates: update_tx,
            requests: request_rx,
        };
        (handle, source)
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Update> {
        match self.updates.try_recv() {
            Ok(update) => Some(update),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }

    fn request(&mut self, request: Request) {
        // A dropped handle just means nobody is listening
        let _ = self.requests.send(request);
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.disconnected.then_some("Channel closed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::CrewStatus;
    use crate::source::{QueryData, QueryKey};

    #[test]
    fn test_channel_source_poll() {
        let (handle, mut source) = ChannelSource::create("test");
        assert!(source.poll().is_none());

        handle.publish(Update::Query {
            key: QueryKey::CrewStatus,
            result: Ok(QueryData::CrewStatus(CrewStatus::default())),
        });

        match source.poll() {
            Some(Update::Query { key, result }) => {
                assert_eq!(key, QueryKey::CrewStatus);
                assert!(result.is_ok());
            }
            other => panic!("unexpected update: {:?}", other),
        }
        assert!(source.poll().is_none());
        assert_eq!(source.description(), "channel: test");
    }

    #[test]
    fn test_channel_source_requests() {
        let (mut handle, mut source) = ChannelSource::create("test");
        source.request(Request::RefreshAll);
        source.request(Request::SetAutoRefresh(false));
        assert_eq!(
            handle.drain_requests(),
            vec![Request::RefreshAll, Request::SetAutoRefresh(false)]
        );
        assert!(handle.drain_requests().is_empty());
    }

    #[test]
    fn test_channel_source_reports_closed_handle() {
        let (handle, mut source) = ChannelSource::create("test");
        drop(handle);
        assert!(source.poll().is_none());
        assert_eq!(source.error(), Some("Channel closed"));
    }
}
