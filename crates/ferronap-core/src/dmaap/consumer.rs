use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::dmaap::{validate_consumer, DmaapClient, FetchOptions};
use crate::domain::TopicName;
use crate::error::{OnapError, OnapErrorKind, ValidationError};

/// Background reader of one topic for one consumer group/id.
#[derive(Debug, Clone)]
pub struct TopicConsumer {
    client: DmaapClient,
    topic: TopicName,
    group: String,
    consumer_id: String,
    options: FetchOptions,
    idle_pause: Duration,
}

/// Running consumer: queued messages and the means to stop the worker.
#[derive(Debug)]
pub struct ConsumerHandle {
    stop: Arc<AtomicBool>,
    receiver: UnboundedReceiver<String>,
    worker: JoinHandle<Result<(), OnapError>>,
}

impl TopicConsumer {
    /// Fails when the group or consumer id is blank.
    pub fn new(
        client: DmaapClient,
        topic: TopicName,
        group: impl Into<String>,
        consumer_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let group = group.into();
        let consumer_id = consumer_id.into();
        validate_consumer(&group, &consumer_id)?;
        Ok(Self {
            client,
            topic,
            group,
            consumer_id,
            options: FetchOptions::default(),
            idle_pause: Duration::from_secs(1),
        })
    }

    pub fn with_fetch_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Pause after an empty batch or a failed fetch.
    pub fn with_idle_pause(mut self, idle_pause: Duration) -> Self {
        self.idle_pause = idle_pause;
        self
    }

    /// Spawn the worker on the current tokio runtime.
    pub fn start(self) -> ConsumerHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(self.run(stop.clone(), sender));
        ConsumerHandle {
            stop,
            receiver,
            worker,
        }
    }

    /// Consume for `duration`, then stop and return every message received,
    /// in delivery order.
    pub async fn consume_for(self, duration: Duration) -> Result<Vec<String>, OnapError> {
        let handle = self.start();
        tokio::time::sleep(duration).await;
        handle.stop().await
    }

    /// Transport and server failures are logged and retried. A rejected
    /// request ends the worker and is returned from [`ConsumerHandle::stop`].
    async fn run(
        self,
        stop: Arc<AtomicBool>,
        sender: UnboundedSender<String>,
    ) -> Result<(), OnapError> {
        info!(topic = %self.topic, group = %self.group, "topic consumer started");
        let mut delivered = 0usize;

        while !stop.load(Ordering::Acquire) {
            match self
                .client
                .fetch(&self.topic, &self.group, &self.consumer_id, self.options)
                .await
            {
                Ok(batch) if batch.is_empty() => tokio::time::sleep(self.idle_pause).await,
                Ok(batch) => {
                    delivered += batch.len();
                    for message in batch {
                        if sender.send(message).is_err() {
                            debug!(topic = %self.topic, "receiver dropped; consumer exiting");
                            return Ok(());
                        }
                    }
                    tokio::task::yield_now().await;
                }
                Err(error) if error.kind() == OnapErrorKind::Validation => {
                    error!(topic = %self.topic, error = %error, "fetch rejected; consumer exiting");
                    return Err(error);
                }
                Err(error) => {
                    warn!(topic = %self.topic, error = %error, "fetch failed; retrying after pause");
                    tokio::time::sleep(self.idle_pause).await;
                }
            }
        }

        info!(topic = %self.topic, delivered, "topic consumer stopped");
        Ok(())
    }
}

impl ConsumerHandle {
    /// Next queued message, if one has arrived.
    pub fn try_next(&mut self) -> Option<String> {
        self.receiver.try_recv().ok()
    }

    /// Wait for the next message; `None` once the worker has exited and the
    /// queue is empty.
    pub async fn next(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    pub fn is_running(&self) -> bool {
        !self.worker.is_finished()
    }

    /// Ask the worker to stop, wait for it and drain the queue.
    ///
    /// The flag is checked between fetches, so this may wait up to one
    /// long-poll timeout. An error that ended the worker early is returned
    /// instead of the queued messages.
    pub async fn stop(mut self) -> Result<Vec<String>, OnapError> {
        self.stop.store(true, Ordering::Release);
        self.worker
            .await
            .map_err(|error| OnapError::Consumer(error.to_string()))??;

        let mut messages = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            messages.push(message);
        }
        Ok(messages)
    }
}
