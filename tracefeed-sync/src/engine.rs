// Copyright 2025 Tracefeed Contributors (https://github.com/tracefeed/tracefeed)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! The live query engine: fetch scheduling, absorption, publication.
//!
//! One [`LiveQuery`] worker task owns all mutable state for a query session.
//! UI-facing calls go through a [`LiveQueryHandle`], which sends commands to
//! the worker and reads published [`ListSnapshot`]s from a watch channel.
//!
//! Fetches run on two lanes, forward pagination and first-page refresh, with
//! at most one request in flight per lane. Completions are absorbed in the
//! order they arrive back on the worker, so races between the lanes resolve
//! deterministically by completion order. Filter switches bump a generation
//! counter; completions stamped with an older generation are discarded.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use tracefeed_core::{
    now_us, FeedError, FilterSet, ListRecord, PageFetcher, PageRequest, RecordPage, RetryPolicy,
    SyncPolicy,
};

use crate::pages::PageSet;
use crate::project::project;
use crate::snapshot::{FetchFailure, FetchLane, ListSnapshot, LoadPhase};

/// The page every query session starts from and refreshes against.
const FIRST_PAGE: u32 = 0;

/// Completion channel capacity. Two lanes mean at most two outstanding
/// completions; the slack covers stale generations not yet drained.
const COMPLETION_BUFFER: usize = 16;

enum Command {
    EndOfListVisible,
    RefreshNow,
    SetFilter(FilterSet),
}

struct FetchOutcome<R> {
    lane: FetchLane,
    page: u32,
    generation: u64,
    result: Result<RecordPage<R>, FeedError>,
}

/// Worker state for one live list query.
///
/// Constructed and spawned through [`LiveQuery::spawn`]; all fields are
/// touched only from the worker task.
pub struct LiveQuery<F: PageFetcher> {
    fetcher: Arc<F>,
    policy: SyncPolicy,
    filter: FilterSet,
    pages: PageSet<F::Record>,
    /// Bumped on every filter switch; completions stamped with an older
    /// generation are discarded.
    generation: u64,
    /// Set once the first page of the current generation has been absorbed.
    loaded: bool,
    forward_in_flight: bool,
    refresh_in_flight: bool,
    last_failure: Option<FetchFailure>,
    version: u64,
    session: Uuid,
    snapshots: watch::Sender<ListSnapshot<F::Record>>,
    completions_tx: mpsc::Sender<FetchOutcome<F::Record>>,
    /// Cancelled when the handle is dropped or shut down.
    cancel: CancellationToken,
    /// Child of `cancel`, replaced on filter switches; in-flight fetch
    /// tasks listen on it.
    fetch_scope: CancellationToken,
}

impl<F: PageFetcher> LiveQuery<F> {
    /// Spawns the worker task for a new query session and returns its handle.
    ///
    /// The session fetches page zero immediately; the first automatic
    /// refresh fires one full interval later.
    pub fn spawn(fetcher: F, policy: SyncPolicy, filter: FilterSet) -> LiveQueryHandle<F::Record> {
        let policy = policy.normalized();
        let session = Uuid::new_v4();
        let (snapshot_tx, snapshot_rx) = watch::channel(ListSnapshot::empty());
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::channel(COMPLETION_BUFFER);
        let cancel = CancellationToken::new();

        let worker = LiveQuery {
            fetcher: Arc::new(fetcher),
            pages: PageSet::new(policy.refetch),
            policy,
            filter,
            generation: 0,
            loaded: false,
            forward_in_flight: false,
            refresh_in_flight: false,
            last_failure: None,
            version: 0,
            session,
            snapshots: snapshot_tx,
            completions_tx: completion_tx,
            cancel: cancel.clone(),
            fetch_scope: cancel.child_token(),
        };
        tokio::spawn(worker.run(command_rx, completion_rx));

        LiveQueryHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            cancel,
            session,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut completions: mpsc::Receiver<FetchOutcome<F::Record>>,
    ) {
        let mut refresh = interval_at(
            Instant::now() + self.policy.refresh_interval,
            self.policy.refresh_interval,
        );
        refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let cancel = self.cancel.clone();

        tracing::debug!(session = %self.session, "live query started");
        self.begin_fetch(FetchLane::Forward, FIRST_PAGE);
        self.publish();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = refresh.tick() => {
                    self.on_refresh_due();
                }
                command = commands.recv() => {
                    match command {
                        Some(Command::EndOfListVisible) => self.on_end_of_list_visible(),
                        Some(Command::RefreshNow) => {
                            self.on_refresh_due();
                            refresh.reset();
                        }
                        Some(Command::SetFilter(filter)) => {
                            self.switch_filter(filter);
                            refresh.reset();
                        }
                        None => break,
                    }
                }
                Some(outcome) = completions.recv() => {
                    self.on_completion(outcome);
                }
            }
        }

        // Stop any in-flight fetch tasks before the worker exits.
        self.fetch_scope.cancel();
        tracing::debug!(session = %self.session, "live query stopped");
    }

    /// Issues a fetch on the given lane unless one is already in flight.
    fn begin_fetch(&mut self, lane: FetchLane, page: u32) {
        match lane {
            FetchLane::Forward => {
                if self.forward_in_flight {
                    return;
                }
                self.forward_in_flight = true;
            }
            FetchLane::Refresh => {
                if self.refresh_in_flight {
                    return;
                }
                self.refresh_in_flight = true;
            }
        }

        let request = PageRequest::new(page, self.policy.page_size, self.filter.clone());
        let fetcher = Arc::clone(&self.fetcher);
        let retry = self.policy.retry.clone();
        let completions = self.completions_tx.clone();
        let scope = self.fetch_scope.clone();
        let generation = self.generation;
        let session = self.session;

        tracing::debug!(session = %session, page, lane = ?lane, generation, "issuing page fetch");
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = scope.cancelled() => return,
                result = fetch_with_retry(fetcher.as_ref(), &request, &retry) => result,
            };
            // A closed channel means the worker already shut down.
            let _ = completions
                .send(FetchOutcome {
                    lane,
                    page,
                    generation,
                    result,
                })
                .await;
        });
    }

    fn on_refresh_due(&mut self) {
        if self.refresh_in_flight {
            // The previous refresh is still out; skip rather than stack
            // requests behind a slow server.
            tracing::debug!(session = %self.session, "refresh due while previous one in flight, skipping");
            return;
        }
        self.begin_fetch(FetchLane::Refresh, FIRST_PAGE);
        self.publish();
    }

    fn on_end_of_list_visible(&mut self) {
        if self.forward_in_flight || !self.pages.frontier_has_more() {
            return;
        }
        let next = self.pages.next_page_index();
        self.begin_fetch(FetchLane::Forward, next);
        self.publish();
    }

    fn switch_filter(&mut self, filter: FilterSet) {
        tracing::debug!(
            session = %self.session,
            generation = self.generation + 1,
            "filter changed, resetting query context"
        );
        self.fetch_scope.cancel();
        self.fetch_scope = self.cancel.child_token();
        self.generation += 1;
        self.filter = filter;
        self.pages.clear();
        self.loaded = false;
        self.forward_in_flight = false;
        self.refresh_in_flight = false;
        self.last_failure = None;
        self.begin_fetch(FetchLane::Forward, FIRST_PAGE);
        self.publish();
    }

    fn on_completion(&mut self, outcome: FetchOutcome<F::Record>) {
        if outcome.generation != self.generation {
            tracing::debug!(
                session = %self.session,
                page = outcome.page,
                stale_generation = outcome.generation,
                current_generation = self.generation,
                "discarding completion from a superseded query context"
            );
            return;
        }
        match outcome.lane {
            FetchLane::Forward => self.forward_in_flight = false,
            FetchLane::Refresh => self.refresh_in_flight = false,
        }
        match outcome.result {
            Ok(page) => {
                tracing::debug!(
                    session = %self.session,
                    page = page.index,
                    records = page.records.len(),
                    has_more = page.has_more,
                    lane = ?outcome.lane,
                    "absorbing fetched page"
                );
                self.pages.absorb(page);
                self.loaded = true;
                self.last_failure = None;
            }
            Err(error) => {
                tracing::warn!(
                    session = %self.session,
                    page = outcome.page,
                    lane = ?outcome.lane,
                    %error,
                    "page fetch failed, keeping previously fetched pages"
                );
                self.last_failure = Some(FetchFailure {
                    page: outcome.page,
                    lane: outcome.lane,
                    error,
                    at_us: now_us(),
                });
            }
        }
        self.publish();
    }

    /// Projects the current pages and publishes a new snapshot.
    fn publish(&mut self) {
        self.version += 1;
        let records = project(self.pages.pages());
        let snapshot = ListSnapshot {
            records: Arc::from(records),
            phase: if self.loaded {
                LoadPhase::Ready
            } else {
                LoadPhase::Loading
            },
            refreshing: self.refresh_in_flight,
            paginating: self.forward_in_flight,
            has_more: self.pages.frontier_has_more(),
            total: self.pages.latest_total(),
            fetched_at_us: self.pages.latest_fetched_at_us(),
            last_failure: self.last_failure.clone(),
            version: self.version,
        };
        self.snapshots.send_replace(snapshot);
    }
}

async fn fetch_with_retry<F: PageFetcher>(
    fetcher: &F,
    request: &PageRequest,
    retry: &RetryPolicy,
) -> Result<RecordPage<F::Record>, FeedError> {
    let attempts = retry.max_attempts.max(1);
    for attempt in 0..attempts {
        if attempt > 0 {
            tokio::time::sleep(retry.delay_for_attempt(attempt - 1)).await;
        }
        match fetcher.fetch_page(request).await {
            Ok(page) => return Ok(page),
            Err(error) if attempt + 1 < attempts && error.is_retryable() => {
                tracing::debug!(page = request.page, attempt, %error, "page fetch failed, will retry");
            }
            Err(error) => return Err(error),
        }
    }
    Err(FeedError::Transport("no fetch attempts configured".to_string()))
}

/// UI-side handle to a live query session.
///
/// Dropping the handle cancels the worker task and any in-flight fetches.
pub struct LiveQueryHandle<R: ListRecord> {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<ListSnapshot<R>>,
    cancel: CancellationToken,
    session: Uuid,
}

impl<R: ListRecord> LiveQueryHandle<R> {
    /// The most recently published snapshot.
    pub fn snapshot(&self) -> ListSnapshot<R> {
        self.snapshots.borrow().clone()
    }

    /// A receiver that observes every subsequent publication.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<R>> {
        self.snapshots.clone()
    }

    /// Snapshot publications as an async stream.
    pub fn snapshot_stream(&self) -> WatchStream<ListSnapshot<R>> {
        WatchStream::new(self.snapshots.clone())
    }

    /// Signals that the rendered list has scrolled to its end.
    ///
    /// Fetches the next page when the frontier reports more data and no
    /// forward fetch is already in flight; otherwise a no-op.
    pub fn end_of_list_visible(&self) {
        let _ = self.commands.send(Command::EndOfListVisible);
    }

    /// Requests an out-of-band refresh of the first page.
    ///
    /// The periodic refresh timer restarts from now.
    pub fn refresh_now(&self) {
        let _ = self.commands.send(Command::RefreshNow);
    }

    /// Replaces the active filter, dropping all accumulated pages.
    ///
    /// Fetches issued under the previous filter are cancelled; any that
    /// still complete are discarded by generation.
    pub fn set_filter(&self, filter: FilterSet) {
        let _ = self.commands.send(Command::SetFilter(filter));
    }

    /// Identifier of this query session, present in engine log events.
    pub fn session_id(&self) -> Uuid {
        self.session
    }

    /// Stops the worker without waiting for it to exit.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl<R: ListRecord> Drop for LiveQueryHandle<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
