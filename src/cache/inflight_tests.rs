use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};

use super::inflight::{InflightRegistry, Join};
use crate::store::{TierError, TierResult};

fn pending_fetch() -> BoxFuture<'static, TierResult<Option<String>>> {
    future::pending().boxed()
}

fn ready_fetch(value: &str) -> BoxFuture<'static, TierResult<Option<String>>> {
    let value = value.to_string();
    async move { Ok(Some(value)) }.boxed()
}

#[test]
fn first_caller_leads_second_follows() {
    let registry: InflightRegistry<String> = InflightRegistry::new();

    let first = registry.join_or_register("k", pending_fetch);
    assert!(matches!(first, Join::Leader { .. }));
    assert!(registry.contains("k"));
    assert_eq!(registry.len(), 1);

    let second = registry.join_or_register("k", pending_fetch);
    assert!(matches!(second, Join::Follower(_)));
    assert_eq!(registry.len(), 1);
}

#[test]
fn distinct_keys_get_distinct_registrations() {
    let registry: InflightRegistry<String> = InflightRegistry::new();

    let a = registry.join_or_register("a", pending_fetch);
    let b = registry.join_or_register("b", pending_fetch);
    assert!(matches!(a, Join::Leader { .. }));
    assert!(matches!(b, Join::Leader { .. }));
    assert_eq!(registry.len(), 2);
}

#[test]
fn complete_removes_entry_and_reports_current() {
    let registry: InflightRegistry<String> = InflightRegistry::new();

    let Join::Leader { guard, .. } = registry.join_or_register("k", pending_fetch) else {
        panic!("expected leadership");
    };

    assert!(guard.complete());
    assert!(!registry.contains("k"));
}

#[test]
fn invalidate_supersedes_the_leader() {
    let registry: InflightRegistry<String> = InflightRegistry::new();

    let Join::Leader { guard, .. } = registry.join_or_register("k", pending_fetch) else {
        panic!("expected leadership");
    };

    registry.invalidate("k");
    assert!(!registry.contains("k"));
    assert!(!guard.complete());
}

#[test]
fn dropping_the_guard_cleans_up() {
    let registry: InflightRegistry<String> = InflightRegistry::new();

    let join = registry.join_or_register("k", pending_fetch);
    assert!(registry.contains("k"));

    drop(join);
    assert!(!registry.contains("k"));
}

#[test]
fn stale_guard_does_not_remove_a_newer_registration() {
    let registry: InflightRegistry<String> = InflightRegistry::new();

    let Join::Leader { guard: stale, .. } = registry.join_or_register("k", pending_fetch) else {
        panic!("expected leadership");
    };
    registry.invalidate("k");

    let replacement = registry.join_or_register("k", pending_fetch);
    assert!(matches!(replacement, Join::Leader { .. }));

    // The superseded guard must not tear down the replacement's entry.
    drop(stale);
    assert!(registry.contains("k"));
}

#[test]
fn clear_drops_everything() {
    let registry: InflightRegistry<String> = InflightRegistry::new();

    let _a = registry.join_or_register("a", pending_fetch);
    let _b = registry.join_or_register("b", pending_fetch);
    registry.clear();
    assert!(registry.is_empty());
}

#[tokio::test]
async fn followers_observe_the_leaders_result() {
    let registry: InflightRegistry<String> = InflightRegistry::new();

    let Join::Leader { fetch, guard } = registry.join_or_register("k", || ready_fetch("v")) else {
        panic!("expected leadership");
    };
    let Join::Follower(joined) = registry.join_or_register("k", pending_fetch) else {
        panic!("expected to join the inflight fetch");
    };

    assert_eq!(fetch.await, Ok(Some("v".to_string())));
    assert_eq!(joined.await, Ok(Some("v".to_string())));
    assert!(guard.complete());
}

#[tokio::test]
async fn followers_observe_the_leaders_failure() {
    let registry: InflightRegistry<String> = InflightRegistry::new();

    let failing = || {
        async {
            Err(TierError::Unavailable {
                reason: "down".to_string(),
            })
        }
        .boxed()
    };

    let Join::Leader { fetch, guard } = registry.join_or_register("k", failing) else {
        panic!("expected leadership");
    };
    let Join::Follower(joined) = registry.join_or_register("k", pending_fetch) else {
        panic!("expected to join the inflight fetch");
    };

    assert!(fetch.await.is_err());
    assert!(joined.await.is_err());
    assert!(guard.complete());
    assert!(registry.is_empty());
}
