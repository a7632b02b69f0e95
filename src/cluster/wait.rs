// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Poll a live object until it reaches a target state, times out or is cancelled

use super::api::ClusterApi;
use super::readiness::{ReadinessRegistry, ReadinessStatus};
use crate::error::{OutfitterError, Result};
use crate::resource::Identity;
use kube::core::DynamicObject;
use std::fmt;
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTarget {
    /// Create and update: pending until ready
    Ready,
    /// Delete: deleting until gone
    Deleted,
}

impl WaitTarget {
    pub fn initial(self) -> ReadinessStatus {
        match self {
            WaitTarget::Ready => ReadinessStatus::Pending,
            WaitTarget::Deleted => ReadinessStatus::Deleting,
        }
    }
}

impl fmt::Display for WaitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitTarget::Ready => f.write_str("ready"),
            WaitTarget::Deleted => f.write_str("deleted"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WaitSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

/// One transition of the state machine, from the outcome of a single fetch
pub fn observe(
    readiness: &ReadinessRegistry,
    target: WaitTarget,
    fetched: Result<DynamicObject>,
) -> Result<ReadinessStatus> {
    match (target, fetched) {
        (WaitTarget::Ready, Ok(live)) => Ok(if readiness.is_ready(&live)? {
            ReadinessStatus::Ready
        } else {
            ReadinessStatus::Pending
        }),
        (WaitTarget::Ready, Err(e)) if e.is_gone() => Ok(ReadinessStatus::Pending),
        (WaitTarget::Deleted, Ok(_)) => Ok(ReadinessStatus::Deleting),
        (WaitTarget::Deleted, Err(e)) if e.is_gone() => Ok(ReadinessStatus::Deleted),
        (_, Err(e)) => Err(e),
    }
}

/// Poll `identity` every `settings.interval` until it reaches `target`.
/// Returns every state observed, starting with the initial one.
#[instrument(skip(api, readiness, identity, settings, cancel), fields(object = %identity))]
pub async fn wait_for(
    api: &ClusterApi,
    readiness: &ReadinessRegistry,
    identity: &Identity,
    target: WaitTarget,
    settings: WaitSettings,
    cancel: &CancellationToken,
) -> Result<Vec<ReadinessStatus>> {
    let started = Instant::now();
    let deadline = started + settings.timeout;
    let mut history = vec![target.initial()];

    loop {
        if cancel.is_cancelled() {
            return Err(OutfitterError::Cancelled(identity.to_string()));
        }

        // the poll that lands on the deadline still gets one interval to answer
        let polled = Instant::now();
        let fetch_deadline = if polled < deadline {
            deadline
        } else {
            polled + settings.interval
        };

        let fetched = tokio::select! {
            _ = cancel.cancelled() => return Err(OutfitterError::Cancelled(identity.to_string())),
            _ = sleep_until(fetch_deadline) => return Err(timed_out(identity, target, started)),
            fetched = api.get(identity) => fetched,
        };

        let status = match observe(readiness, target, fetched) {
            Ok(status) => status,
            Err(e) => {
                warn!("{} is in state {}: {}", identity, ReadinessStatus::Error, e);
                return Err(e);
            }
        };
        debug!("{} is {}", identity, status);
        history.push(status);

        if status.is_terminal() {
            info!("{} is {} after {:?}", identity, status, started.elapsed());
            return Ok(history);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(timed_out(identity, target, started));
        }

        let pause = settings.interval.min(deadline - now);
        tokio::select! {
            _ = cancel.cancelled() => return Err(OutfitterError::Cancelled(identity.to_string())),
            _ = sleep(pause) => {}
        }
    }
}

fn timed_out(identity: &Identity, target: WaitTarget, started: Instant) -> OutfitterError {
    OutfitterError::Timeout {
        object: identity.to_string(),
        target: target.to_string(),
        elapsed: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeApiServer, StalledService};
    use serde_json::json;

    const PATH: &str = "/apis/apps/v1/namespaces/jobs/deployments/worker";

    fn identity() -> Identity {
        Identity::new("apps", "v1", "Deployment", "jobs", "worker")
    }

    fn settings() -> WaitSettings {
        WaitSettings {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(60),
        }
    }

    fn worker() -> serde_json::Value {
        json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": "worker", "namespace": "jobs"},
            "spec": {"replicas": 2}
        })
    }

    #[test]
    fn test_observe_transition_table() {
        let registry = ReadinessRegistry::default();
        let live: DynamicObject = serde_json::from_value(worker()).unwrap();
        let gone = || OutfitterError::NotFound("x".to_string());
        let unknown = || OutfitterError::KindUnknown("x".to_string());

        assert_eq!(
            observe(&registry, WaitTarget::Ready, Ok(live.clone())).unwrap(),
            ReadinessStatus::Ready
        );
        assert_eq!(
            observe(&registry, WaitTarget::Ready, Err(gone())).unwrap(),
            ReadinessStatus::Pending
        );
        assert_eq!(
            observe(&registry, WaitTarget::Deleted, Ok(live)).unwrap(),
            ReadinessStatus::Deleting
        );
        assert_eq!(
            observe(&registry, WaitTarget::Deleted, Err(gone())).unwrap(),
            ReadinessStatus::Deleted
        );
        assert_eq!(
            observe(&registry, WaitTarget::Deleted, Err(unknown())).unwrap(),
            ReadinessStatus::Deleted
        );
        assert!(observe(
            &registry,
            WaitTarget::Ready,
            Err(OutfitterError::Conflict("x".to_string()))
        )
        .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_ready_follows_replica_progression() {
        let server = FakeApiServer::new()
            .with_object(PATH, worker())
            .with_status_sequence(PATH, vec![json!({"readyReplicas": 0}), json!({"readyReplicas": 2})]);
        let api = ClusterApi::new(server.into_client());

        let history = wait_for(
            &api,
            &ReadinessRegistry::default(),
            &identity(),
            WaitTarget::Ready,
            settings(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(
            history,
            vec![ReadinessStatus::Pending, ReadinessStatus::Pending, ReadinessStatus::Ready]
        );
        assert_eq!(server.count("GET", PATH), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_times_out_naming_object() {
        let server = FakeApiServer::new()
            .with_object(PATH, worker())
            .with_status_sequence(PATH, vec![json!({"readyReplicas": 0})]);
        let api = ClusterApi::new(server.into_client());

        let err = wait_for(
            &api,
            &ReadinessRegistry::default(),
            &identity(),
            WaitTarget::Ready,
            settings(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        match err {
            OutfitterError::Timeout { object, target, elapsed } => {
                assert_eq!(object, identity().to_string());
                assert_eq!(target, "ready");
                assert!(elapsed >= Duration::from_secs(60));
            }
            other => panic!("unexpected error {:?}", other),
        }
        // one poll at t=0 and every 5s up to and including t=60
        assert_eq!(server.count("GET", PATH), 13);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_stops_on_cancellation() {
        let server = FakeApiServer::new()
            .with_object(PATH, worker())
            .with_status_sequence(PATH, vec![json!({"readyReplicas": 0})]);
        let api = ClusterApi::new(server.into_client());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(12)).await;
            trigger.cancel();
        });

        let err = wait_for(
            &api,
            &ReadinessRegistry::default(),
            &identity(),
            WaitTarget::Ready,
            settings(),
            &cancel,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, OutfitterError::Cancelled(_)));
        assert_eq!(server.count("GET", PATH), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_surfaces_fetch_errors() {
        let server = FakeApiServer::new().fail("GET", PATH, 500, "InternalError");
        let api = ClusterApi::new(server.into_client());

        let err = wait_for(
            &api,
            &ReadinessRegistry::default(),
            &identity(),
            WaitTarget::Deleted,
            settings(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, OutfitterError::Transport(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_times_out_while_fetch_is_stalled() {
        let api = ClusterApi::new(StalledService.into_client());
        let started = Instant::now();

        let err = wait_for(
            &api,
            &ReadinessRegistry::default(),
            &identity(),
            WaitTarget::Deleted,
            settings(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        match err {
            OutfitterError::Timeout { object, target, .. } => {
                assert_eq!(object, identity().to_string());
                assert_eq!(target, "deleted");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(started.elapsed() >= Duration::from_secs(60));
        assert!(started.elapsed() < Duration::from_secs(61));
    }
}
