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

//! The `traces` and `runs` subcommands: wire an HTTP fetcher into a live
//! query and render each published snapshot.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use serde_json::Value;
use tokio::sync::watch;

use tracefeed_client::{ClientConfig, RunListClient, TraceListClient};
use tracefeed_core::{FeedConfig, FilterSet, ListRecord, PageFetcher, Selection, SyncPolicy};
use tracefeed_sync::{ListSnapshot, LiveQuery};

use crate::render;

/// Arguments shared by the `traces` and `runs` subcommands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Server base URL (overrides config file and environment)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Filter criterion, repeatable; JSON values keep their type
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Records per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Seconds between automatic refreshes of the first page
    #[arg(long)]
    pub refresh_secs: Option<u64>,

    /// Pages to load before the first render
    #[arg(long, default_value_t = 1)]
    pub pages: u32,

    /// Record identifier to highlight in the output
    #[arg(long)]
    pub select: Option<String>,

    /// Render one snapshot and exit instead of following
    #[arg(long)]
    pub once: bool,
}

/// Follows the trace list.
pub async fn follow_traces(args: ListArgs) -> Result<()> {
    let setup = Setup::resolve(&args)?;
    let fetcher = TraceListClient::traces(&setup.client)?;
    follow(fetcher, setup, args, render::trace_row).await
}

/// Follows the workflow-run list.
pub async fn follow_runs(args: ListArgs) -> Result<()> {
    let setup = Setup::resolve(&args)?;
    let fetcher = RunListClient::runs(&setup.client)?;
    follow(fetcher, setup, args, render::run_row).await
}

/// Resolved settings for one follow session.
struct Setup {
    client: ClientConfig,
    policy: SyncPolicy,
    filter: FilterSet,
}

impl Setup {
    /// Merges config file, environment, and command-line flags, in that
    /// order of increasing precedence.
    fn resolve(args: &ListArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => FeedConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?
                .apply_env(),
            None => FeedConfig::from_env(),
        };
        if let Some(endpoint) = &args.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(page_size) = args.page_size {
            config.page_size = page_size;
        }
        if let Some(secs) = args.refresh_secs {
            config.refresh_ms = secs.saturating_mul(1_000);
        }

        let client = ClientConfig::new(&config.endpoint).with_timeout(config.request_timeout());
        Ok(Self {
            client,
            policy: config.sync_policy(),
            filter: parse_filters(&args.filters)?,
        })
    }
}

/// Parses repeated `KEY=VALUE` flags into a filter set.
///
/// Values that parse as JSON keep their type, so `limit=10` stays numeric
/// and `failed=true` stays boolean; anything else is sent as a string.
fn parse_filters(raw: &[String]) -> Result<FilterSet> {
    let mut filter = FilterSet::new();
    for entry in raw {
        let Some((key, value)) = entry.split_once('=') else {
            bail!("invalid filter {entry:?}: expected KEY=VALUE");
        };
        if key.is_empty() {
            bail!("invalid filter {entry:?}: empty key");
        }
        let value =
            serde_json::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.into()));
        filter.insert(key, value);
    }
    Ok(filter)
}

async fn follow<F>(
    fetcher: F,
    setup: Setup,
    args: ListArgs,
    row: fn(&F::Record) -> String,
) -> Result<()>
where
    F: PageFetcher,
{
    let mut selection = Selection::none();
    if let Some(id) = &args.select {
        selection.select(id.clone());
    }

    let handle = LiveQuery::spawn(fetcher, setup.policy, setup.filter);
    tracing::info!(session = %handle.session_id(), "live query started");
    let mut snapshots = handle.subscribe();

    // First page: wait until it lands or its fetch gives up.
    wait_until(&mut snapshots, |s| {
        !s.is_loading() || s.last_failure.is_some()
    })
    .await?;

    // Deeper pages requested up front via --pages.
    let mut fetched = 1u32;
    while fetched < args.pages {
        let issued = {
            let snapshot = snapshots.borrow();
            if !snapshot.has_more {
                break;
            }
            snapshot.version
        };
        handle.end_of_list_visible();
        wait_until(&mut snapshots, move |s| {
            s.version > issued && !s.paginating
        })
        .await?;
        fetched += 1;
    }

    if args.once {
        let snapshot = snapshots.borrow_and_update().clone();
        handle.shutdown();
        if snapshot.is_loading() {
            if let Some(failure) = &snapshot.last_failure {
                bail!("initial fetch failed: {}", failure.error);
            }
        }
        print!("{}", render::render_snapshot(&snapshot, &selection, row));
        return Ok(());
    }

    let snapshot = snapshots.borrow_and_update().clone();
    print!("{}", render::render_snapshot(&snapshot, &selection, row));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                println!();
                print!("{}", render::render_snapshot(&snapshot, &selection, row));
            }
        }
    }

    handle.shutdown();
    Ok(())
}

/// Waits for a published snapshot satisfying `predicate`.
async fn wait_until<R, P>(
    snapshots: &mut watch::Receiver<ListSnapshot<R>>,
    predicate: P,
) -> Result<()>
where
    R: ListRecord,
    P: Fn(&ListSnapshot<R>) -> bool,
{
    loop {
        {
            let snapshot = snapshots.borrow_and_update();
            if predicate(&snapshot) {
                return Ok(());
            }
        }
        snapshots
            .changed()
            .await
            .map_err(|_| anyhow!("sync engine stopped"))?;
    }
}
