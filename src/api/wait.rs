//! Action-wait controller.
//!
//! Mutation endpoints return immediately with links to server-side actions;
//! this module polls those actions until they reach a terminal state so the
//! rest of the crate can pretend mutations are synchronous. Polling sleeps are
//! drawn with full jitter: uniform over `[0, min(cap, base * factor^attempt))`.

use super::error::ApiError;
use super::http::Sdk;
use super::types::{Action, Links};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;

const BASE_SECONDS: f64 = 4.0;
const CAP_SECONDS: f64 = 30.0;
const FACTOR: f64 = 1.5;

#[derive(Deserialize)]
struct ActionRoot {
    action: Action,
}

/// Block until every action referenced by `links` terminates.
///
/// Actions are awaited sequentially; the first failure wins. A `None` or
/// action-less `links` is a no-op.
pub async fn wait_for_actions(
    sdk: &Sdk,
    cancel: &CancellationToken,
    links: Option<&Links>,
) -> Result<(), ApiError> {
    let Some(links) = links else {
        return Ok(());
    };
    for link in &links.actions {
        let root: ActionRoot = sdk.get(&format!("actions/{}", link.id)).await?;
        wait_for_action(sdk, cancel, root.action).await?;
    }
    Ok(())
}

/// Poll a single action until it is `done` (or carries a completion
/// timestamp), fail on `errored`, and report a timeout naming the action if
/// the context is cancelled first.
pub async fn wait_for_action(
    sdk: &Sdk,
    cancel: &CancellationToken,
    mut action: Action,
) -> Result<(), ApiError> {
    // One generator per call, seeded from the clock; no shared PRNG state.
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut attempt = 0i32;
    loop {
        if action.status == "errored" {
            return Err(ApiError::ActionErrored(action.describe()));
        }
        if action.completed_at.is_some() || action.status == "done" {
            return Ok(());
        }

        let window = CAP_SECONDS.min(BASE_SECONDS * FACTOR.powi(attempt));
        let sleep = Duration::from_secs_f64(rng.random::<f64>() * window);
        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(ApiError::Timeout { action_id: action.id });
            }
            _ = tokio::time::sleep(sleep) => {}
        }
        attempt += 1;

        let root: ActionRoot = sdk.get(&format!("actions/{}", action.id)).await?;
        action = root.action;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn action(status: &str) -> Action {
        Action {
            id: 42,
            status: status.to_string(),
            kind: "create".to_string(),
            resource_id: 7,
            resource_type: "droplet".to_string(),
            ..Action::default()
        }
    }

    fn action_body(status: &str) -> serde_json::Value {
        json!({"action": {
            "id": 42,
            "status": status,
            "type": "create",
            "resource_id": 7,
            "resource_type": "droplet"
        }})
    }

    async fn sdk_for(server: &MockServer) -> Sdk {
        Sdk::anonymous()
            .unwrap()
            .with_base_url(url::Url::parse(&server.uri()).unwrap().join("/").unwrap())
    }

    #[tokio::test]
    async fn done_action_returns_without_polling() {
        let server = MockServer::start().await;
        let sdk = sdk_for(&server).await;
        // No mock mounted: any poll would fail, proving none happens.
        wait_for_action(&sdk, &CancellationToken::new(), action("done"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn errored_action_surfaces_its_description() {
        let server = MockServer::start().await;
        let sdk = sdk_for(&server).await;
        let err = wait_for_action(&sdk, &CancellationToken::new(), action("errored"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ActionErrored(_)));
        assert!(err.to_string().contains("42"));
    }

    #[tokio::test(start_paused = true)]
    async fn in_progress_action_is_polled_to_completion() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/actions/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(action_body("done")))
            .mount(&server)
            .await;
        let sdk = sdk_for(&server).await;
        wait_for_action(&sdk, &CancellationToken::new(), action("in-progress"))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_yields_timeout_naming_the_action() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/actions/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(action_body("in-progress")))
            .mount(&server)
            .await;
        let sdk = sdk_for(&server).await;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = wait_for_action(&sdk, &cancel, action("in-progress"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Timeout { action_id: 42 }));
    }

    #[tokio::test]
    async fn no_links_is_a_no_op() {
        let server = MockServer::start().await;
        let sdk = sdk_for(&server).await;
        wait_for_actions(&sdk, &CancellationToken::new(), None)
            .await
            .unwrap();
        wait_for_actions(&sdk, &CancellationToken::new(), Some(&Links::default()))
            .await
            .unwrap();
    }

    #[test]
    fn jitter_windows_grow_to_the_cap() {
        // Window sequence is base * factor^n capped at 30s; a completed action
        // at poll N sleeps at most the sum of the first N windows.
        let mut windows = Vec::new();
        for attempt in 0..10 {
            windows.push(CAP_SECONDS.min(BASE_SECONDS * FACTOR.powi(attempt)));
        }
        assert_eq!(windows[0], 4.0);
        assert_eq!(windows[1], 6.0);
        assert_eq!(windows[2], 9.0);
        assert!(windows.iter().all(|w| *w <= CAP_SECONDS));
        assert_eq!(*windows.last().unwrap(), CAP_SECONDS);
    }
}
