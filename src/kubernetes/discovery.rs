// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! API discovery with retry

use crate::constants::discovery::{MAX_ATTEMPTS, RETRY_INTERVAL_SECS, RETRY_MAX_INTERVAL_SECS};
use crate::error::Result;
use kube::{discovery::Discovery, Client};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Run full API discovery. Aggregated APIs can fail transiently right after
/// they are registered, so failures are retried with exponential backoff
/// starting at RETRY_INTERVAL_SECS seconds.
pub async fn run_discovery(client: &Client) -> Result<Discovery> {
    let mut interval = RETRY_INTERVAL_SECS;
    let mut attempt = 1;

    loop {
        match Discovery::new(client.clone()).run().await {
            Ok(discovery) => {
                info!("API discovery found {} groups", discovery.groups().count());
                return Ok(discovery);
            }
            Err(e) if attempt < MAX_ATTEMPTS => {
                warn!(
                    "API discovery failed (attempt {}/{}): {}, retrying in {} seconds...",
                    attempt, MAX_ATTEMPTS, e, interval
                );
            }
            Err(e) => return Err(e.into()),
        }

        sleep(Duration::from_secs(interval)).await;

        // Exponential backoff with max cap
        interval = (interval * 2).min(RETRY_MAX_INTERVAL_SECS);
        attempt += 1;
    }
}
