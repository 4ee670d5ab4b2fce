use super::{Cursor, RunToken, StepOutcome, TRACING_TARGET};
use super::session::Session;
use crate::error::PlaybackError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// What [`Playback::toggle_run`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunToggle {
    Started,
    Stopped,
    /// The graph is empty, so there was nothing to start.
    NothingToRun,
}

/// Drives a [`Session`] with a periodic tick on the Tokio runtime.
///
/// At most one tick task exists at a time. Stopping, resetting or deleting
/// the current node invalidates the run under the session lock, so a tick
/// already scheduled for an old run never moves the cursor. Cursor changes
/// are published on a watch channel.
pub struct Playback {
    session: Arc<Mutex<Session>>,
    cursor_tx: watch::Sender<Cursor>,
    ticker: Option<JoinHandle<()>>,
}

impl Playback {
    pub fn new(session: Session) -> Self {
        let (cursor_tx, _) = watch::channel(session.cursor());
        Self {
            session: Arc::new(Mutex::new(session)),
            cursor_tx,
            ticker: None,
        }
    }

    /// Receives every cursor change, including those made by ticks.
    pub fn subscribe(&self) -> watch::Receiver<Cursor> {
        self.cursor_tx.subscribe()
    }

    pub fn cursor(&self) -> Cursor {
        self.session.lock().cursor()
    }

    pub fn is_running(&self) -> bool {
        self.session.lock().is_running()
    }

    /// Runs `f` with exclusive access to the session, then publishes the cursor.
    ///
    /// Edits made here, such as [`Session::delete_node`], are serialized
    /// with the ticks.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut session = self.session.lock();
        let result = f(&mut session);
        self.cursor_tx.send_replace(session.cursor());
        result
    }

    pub fn step(&self) -> StepOutcome {
        self.with_session(Session::step)
    }

    pub fn reset(&mut self) {
        self.with_session(Session::reset);
        self.abort_ticker();
    }

    /// Stops the run, leaving the cursor where it is. Returns whether a run was active.
    pub fn stop(&mut self) -> bool {
        let was_running = self.with_session(Session::end_run);
        self.abort_ticker();
        was_running
    }

    /// Starts a run when stopped, or stops the one in progress.
    ///
    /// Starting from idle first enters the first node. Ticks then follow at
    /// the session's configured interval until the run stops or the cursor
    /// reaches a node without outgoing edges.
    pub fn toggle_run(&mut self) -> Result<RunToggle, PlaybackError> {
        if self.is_running() {
            self.stop();
            return Ok(RunToggle::Stopped);
        }

        let handle = Handle::try_current().map_err(|_| PlaybackError::NoRuntime)?;
        let started = self.with_session(|session| {
            session
                .begin_run()
                .map(|token| (token, session.config().tick_interval()))
        });
        let Some((token, period)) = started else {
            return Ok(RunToggle::NothingToRun);
        };

        self.abort_ticker();
        tracing::debug!(target: TRACING_TARGET, period_ms = period.as_millis() as u64, "Scheduling ticks");
        self.ticker = Some(handle.spawn(run_ticks(
            Arc::clone(&self.session),
            self.cursor_tx.clone(),
            token,
            period,
        )));
        Ok(RunToggle::Started)
    }

    /// Waits until the current run ends on its own. Returns immediately when
    /// nothing is running.
    pub async fn finished(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            if let Err(err) = ticker.await {
                tracing::debug!(target: TRACING_TARGET, error = %err, "Tick task ended abnormally");
            }
        }
    }

    fn abort_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.abort_ticker();
    }
}

async fn run_ticks(
    session: Arc<Mutex<Session>>,
    cursor_tx: watch::Sender<Cursor>,
    token: RunToken,
    period: Duration,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let keep_going = {
            let mut session = session.lock();
            let outcome = session.tick(token);
            cursor_tx.send_replace(session.cursor());
            outcome.is_some() && session.is_running()
        };
        if !keep_going {
            tracing::debug!(target: TRACING_TARGET, "Tick loop finished");
            break;
        }
    }
}
