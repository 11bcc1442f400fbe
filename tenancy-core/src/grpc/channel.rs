//! # Managed gRPC Channel
//!
//! A tonic `Channel` is released implicitly when its last clone is dropped, which
//! gives the caller no way to let in-flight calls finish or to bound how long that
//! takes. [`ManagedChannel`] wraps any gRPC transport with an explicit lifecycle:
//!
//! 1. **Open**: calls are accepted and counted while in flight.
//! 2. **Shut down** ([`Terminate::shutdown`]): new calls fail with [`ChannelError::ShutDown`],
//!    in-flight calls keep running.
//! 3. **Terminated**: shut down and no call in flight.
//!
//! [`Terminate::shutdown_now`] additionally aborts every in-flight call with
//! [`ChannelError::Aborted`].
//!
//! [`release`] chains these steps with a grace period, and [`scoped`] runs an
//! operation against the channel and releases it afterwards, whatever the
//! operation returned.
use crate::BoxError;
use crate::config::ChannelConfig;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::watch;
use tonic::codegen::Service;
use tonic::transport::{Channel, Endpoint};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Invalid endpoint '{0}': {1}")]
    InvalidEndpoint(String, #[source] tonic::transport::Error),
    #[error("The channel has been shut down and accepts no new calls")]
    ShutDown,
    #[error("The call was aborted by a forced channel shutdown")]
    Aborted,
}

/// How a channel was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    /// Every in-flight call completed within the grace period.
    Graceful,
    /// The grace period elapsed and in-flight calls were aborted.
    Forced,
}

/// The shutdown protocol of a channel-like resource.
pub trait Terminate {
    /// Stops accepting new calls. Calls already in flight continue.
    fn shutdown(&self);

    /// Waits up to `timeout` for the resource to terminate.
    ///
    /// Returns `true` if it terminated in time.
    fn await_termination(&self, timeout: Duration) -> impl Future<Output = bool> + Send;

    /// Shuts down and aborts every call still in flight.
    fn shutdown_now(&self);
}

/// Releases `channel`: graceful shutdown first, forced shutdown if it does not
/// terminate within `grace`.
pub async fn release<C>(channel: &C, grace: Duration) -> Teardown
where
    C: Terminate + ?Sized,
{
    channel.shutdown();

    if channel.await_termination(grace).await {
        info!("channel terminated gracefully");
        Teardown::Graceful
    } else {
        warn!(
            ?grace,
            "channel did not terminate within the grace period, forcing shutdown"
        );
        channel.shutdown_now();
        Teardown::Forced
    }
}

/// Runs `op` with a handle to `channel`, then releases the channel.
///
/// The release happens whether `op` succeeded or not, so an operation returning
/// a `Result` gets it back untouched alongside the [`Teardown`] outcome.
pub async fn scoped<C, F, Fut, T>(channel: C, grace: Duration, op: F) -> (T, Teardown)
where
    C: Terminate + Clone,
    F: FnOnce(C) -> Fut,
    Fut: Future<Output = T>,
{
    let output = op(channel.clone()).await;
    let teardown = release(&channel, grace).await;
    (output, teardown)
}

#[derive(Debug, Clone, Copy, Default)]
struct State {
    shutdown: bool,
    aborted: bool,
    in_flight: usize,
}

impl State {
    fn is_terminated(&self) -> bool {
        self.shutdown && self.in_flight == 0
    }
}

#[derive(Debug)]
struct Lifecycle {
    state: watch::Sender<State>,
}

/// Keeps a call counted as in flight until dropped.
struct InFlight(Arc<Lifecycle>);

impl InFlight {
    fn enter(lifecycle: &Arc<Lifecycle>) -> Self {
        lifecycle.state.send_modify(|s| s.in_flight += 1);
        Self(Arc::clone(lifecycle))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.state.send_modify(|s| s.in_flight -= 1);
    }
}

/// A gRPC transport with an explicit shutdown lifecycle.
///
/// Clones share the same lifecycle: shutting down one clone shuts down all of them.
#[derive(Debug, Clone)]
pub struct ManagedChannel<S = Channel> {
    inner: S,
    lifecycle: Arc<Lifecycle>,
}

impl ManagedChannel<Channel> {
    /// Builds a plaintext channel to `endpoint` that connects on first use.
    ///
    /// Connection failures therefore surface from the first call, not from here.
    pub fn connect_lazy(endpoint: &str, config: &ChannelConfig) -> Result<Self, ChannelError> {
        let parsed = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| ChannelError::InvalidEndpoint(endpoint.to_string(), e))?;

        Ok(Self::new(config.apply_to_endpoint(parsed).connect_lazy()))
    }
}

impl<S> ManagedChannel<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            lifecycle: Arc::new(Lifecycle {
                state: watch::Sender::new(State::default()),
            }),
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.lifecycle.state.borrow().shutdown
    }

    pub fn is_terminated(&self) -> bool {
        self.lifecycle.state.borrow().is_terminated()
    }

    /// Number of calls currently in flight.
    pub fn in_flight(&self) -> usize {
        self.lifecycle.state.borrow().in_flight
    }
}

impl<S> Terminate for ManagedChannel<S> {
    fn shutdown(&self) {
        self.lifecycle.state.send_modify(|s| s.shutdown = true);
    }

    fn await_termination(&self, timeout: Duration) -> impl Future<Output = bool> + Send {
        let mut state = self.lifecycle.state.subscribe();

        async move {
            let terminated = async move { state.wait_for(State::is_terminated).await.is_ok() };
            matches!(tokio::time::timeout(timeout, terminated).await, Ok(true))
        }
    }

    fn shutdown_now(&self) {
        self.lifecycle.state.send_modify(|s| {
            s.shutdown = true;
            s.aborted = true;
        });
    }
}

impl<S, B> Service<http::Request<B>> for ManagedChannel<S>
where
    S: Service<http::Request<B>>,
    S::Error: Into<BoxError>,
    S::Response: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if self.is_shutdown() {
            return Poll::Ready(Err(ChannelError::ShutDown.into()));
        }

        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: http::Request<B>) -> Self::Future {
        let in_flight = InFlight::enter(&self.lifecycle);
        let mut state = self.lifecycle.state.subscribe();
        let response = self.inner.call(request);

        Box::pin(async move {
            let _in_flight = in_flight;

            tokio::select! {
                response = response => response.map_err(Into::into),
                _ = state.wait_for(|s| s.aborted) => Err(ChannelError::Aborted.into()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records the shutdown protocol and terminates only when told to.
    #[derive(Clone, Default)]
    struct FakeChannel {
        events: Arc<Mutex<Vec<&'static str>>>,
        terminates: bool,
    }

    impl FakeChannel {
        fn events(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Terminate for FakeChannel {
        fn shutdown(&self) {
            self.events.lock().unwrap().push("shutdown");
        }

        fn await_termination(&self, timeout: Duration) -> impl Future<Output = bool> + Send {
            let terminates = self.terminates;
            let events = Arc::clone(&self.events);

            async move {
                events.lock().unwrap().push("await_termination");
                if !terminates {
                    tokio::time::sleep(timeout).await;
                }
                terminates
            }
        }

        fn shutdown_now(&self) {
            self.events.lock().unwrap().push("shutdown_now");
        }
    }

    #[tokio::test]
    async fn test_release_graceful() {
        let channel = FakeChannel {
            terminates: true,
            ..Default::default()
        };

        let teardown = release(&channel, Duration::from_secs(5)).await;

        assert_eq!(teardown, Teardown::Graceful);
        assert_eq!(channel.events(), vec!["shutdown", "await_termination"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_forces_shutdown_after_grace_period() {
        let channel = FakeChannel::default();
        let started = tokio::time::Instant::now();

        let teardown = release(&channel, Duration::from_secs(5)).await;

        assert_eq!(teardown, Teardown::Forced);
        assert_eq!(started.elapsed(), Duration::from_secs(5));
        assert_eq!(
            channel.events(),
            vec!["shutdown", "await_termination", "shutdown_now"]
        );
    }

    /// Never terminates, and says so without waiting.
    struct Stuck;

    impl Terminate for Stuck {
        fn shutdown(&self) {}

        fn await_termination(&self, _timeout: Duration) -> impl Future<Output = bool> + Send {
            std::future::ready(false)
        }

        fn shutdown_now(&self) {}
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_forced_release_logs_the_full_grace_period() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let teardown = release(&Stuck, Duration::MAX).await;

        assert_eq!(teardown, Teardown::Forced);
        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("grace=18446744073709551615.999999999s"), "{logs}");
    }

    #[tokio::test]
    async fn test_scoped_releases_after_failed_operation() {
        let channel = FakeChannel {
            terminates: true,
            ..Default::default()
        };

        let (result, teardown): (Result<(), &str>, _) =
            scoped(channel.clone(), Duration::from_secs(5), |_| async {
                Err("connection refused")
            })
            .await;

        assert_eq!(result, Err("connection refused"));
        assert_eq!(teardown, Teardown::Graceful);
        assert_eq!(channel.events(), vec!["shutdown", "await_termination"]);
    }

    #[tokio::test]
    async fn test_idle_managed_channel_terminates_immediately() {
        let channel = ManagedChannel::new(());

        assert!(!channel.is_terminated());
        channel.shutdown();

        assert!(channel.is_shutdown());
        assert!(channel.is_terminated());
        assert!(channel.await_termination(Duration::from_secs(5)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_managed_channel_never_terminates() {
        let channel = ManagedChannel::new(());

        assert!(!channel.await_termination(Duration::from_secs(5)).await);
    }
}
