//! Rotation state machine and cooldown
//!
//! The coordinator holds the current credential index and the lazily-bound
//! session. `on_rate_limited` advances the index modulo the pool size;
//! wrapping back to index 0 means every credential was tried within this
//! detection window, which is reported as `CooldownRequired` rather than
//! another rotation. After the cooldown the caller retries with
//! credential 0.
//!
//! Execution is single-threaded by design (the shared rate budget is the
//! bottleneck), so the coordinator is a plain `&mut self` struct. Anyone
//! adding workers must give each its own coordinator over a disjoint
//! credential subset.

use std::sync::Arc;
use std::time::Duration;

use source::{EdgeSource, SessionFactory};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// What the collection loop should do after a rate-limit signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDecision {
    /// An untried credential remains; the session has been unbound and
    /// will rebind to this index on next use.
    Rotate(usize),
    /// The full pool is exhausted; wait out the reset window, then retry
    /// with credential 0.
    CooldownRequired,
}

/// Owns the rotation state and the pause/rotate decision logic.
pub struct RateLimitCoordinator {
    factory: Arc<dyn SessionFactory>,
    pool_size: usize,
    cooldown: Duration,
    current_index: usize,
    session: Option<Box<dyn EdgeSource>>,
}

impl RateLimitCoordinator {
    /// Create a coordinator over `pool_size` credentials, starting at
    /// index 0 with no session bound.
    pub fn new(
        factory: Arc<dyn SessionFactory>,
        pool_size: usize,
        cooldown: Duration,
    ) -> Result<Self> {
        if pool_size == 0 {
            return Err(Error::EmptyPool);
        }
        Ok(Self {
            factory,
            pool_size,
            cooldown,
            current_index: 0,
            session: None,
        })
    }

    /// Index of the credential the active session is (or will be) bound to.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The session bound to the current credential, opening it on first
    /// use or after a rotation. An auth failure here is fatal for the run.
    pub async fn session(&mut self) -> Result<&dyn EdgeSource> {
        let session = match self.session.take() {
            Some(session) => session,
            None => {
                debug!(credential_index = self.current_index, "opening session");
                self.factory.open(self.current_index).await?
            }
        };
        Ok(&**self.session.insert(session))
    }

    /// Record a rate-limit signal and decide between rotation and cooldown.
    ///
    /// The active session is unbound either way: after a rotation the next
    /// fetch binds the new credential, and after a cooldown it rebinds
    /// credential 0 fresh.
    pub fn on_rate_limited(&mut self) -> RotationDecision {
        self.session = None;
        let next = (self.current_index + 1) % self.pool_size;
        self.current_index = next;
        if next == 0 {
            info!(pool_size = self.pool_size, "credential pool exhausted");
            RotationDecision::CooldownRequired
        } else {
            info!(credential_index = next, "rotating to next credential");
            RotationDecision::Rotate(next)
        }
    }

    /// Wait out the upstream rate-limit reset window.
    ///
    /// Plain blocking pause for this engine's single worker; progress is
    /// observable through the surrounding log events. Not cancellable
    /// mid-wait by design.
    pub async fn cooldown(&self) {
        info!(
            cooldown_secs = self.cooldown.as_secs(),
            "waiting for rate-limit window to reset"
        );
        tokio::time::sleep(self.cooldown).await;
        info!("cooldown complete, resuming with credential 0");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use source::EdgeResult;

    /// Session fake that remembers which credential index it was opened for.
    struct FakeSession {
        index: usize,
    }

    impl EdgeSource for FakeSession {
        fn fetch_follows<'a>(
            &'a self,
            _user_id: &'a str,
        ) -> Pin<Box<dyn Future<Output = EdgeResult> + Send + 'a>> {
            let index = self.index;
            Box::pin(async move { EdgeResult::Follows(vec![index as u64]) })
        }
    }

    /// Factory fake recording every open call.
    struct FakeFactory {
        opened: Mutex<Vec<usize>>,
    }

    impl FakeFactory {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                opened: Mutex::new(Vec::new()),
            })
        }

        fn opened(&self) -> Vec<usize> {
            self.opened.lock().unwrap().clone()
        }
    }

    impl SessionFactory for FakeFactory {
        fn open(
            &self,
            credential_index: usize,
        ) -> Pin<Box<dyn Future<Output = source::Result<Box<dyn EdgeSource>>> + Send + '_>>
        {
            self.opened.lock().unwrap().push(credential_index);
            Box::pin(async move {
                Ok(Box::new(FakeSession {
                    index: credential_index,
                }) as Box<dyn EdgeSource>)
            })
        }
    }

    fn coordinator(factory: Arc<FakeFactory>, pool_size: usize) -> RateLimitCoordinator {
        RateLimitCoordinator::new(factory, pool_size, Duration::from_secs(900)).unwrap()
    }

    #[test]
    fn empty_pool_is_rejected() {
        let factory = FakeFactory::new();
        assert!(matches!(
            RateLimitCoordinator::new(factory, 0, Duration::from_secs(1)),
            Err(Error::EmptyPool)
        ));
    }

    #[test]
    fn starts_at_index_zero() {
        let coord = coordinator(FakeFactory::new(), 3);
        assert_eq!(coord.current_index(), 0);
    }

    #[test]
    fn rotates_through_pool_then_demands_cooldown() {
        let mut coord = coordinator(FakeFactory::new(), 3);

        assert_eq!(coord.on_rate_limited(), RotationDecision::Rotate(1));
        assert_eq!(coord.on_rate_limited(), RotationDecision::Rotate(2));
        assert_eq!(coord.on_rate_limited(), RotationDecision::CooldownRequired);
        assert_eq!(coord.current_index(), 0);

        // The cycle repeats from 0 after a cooldown.
        assert_eq!(coord.on_rate_limited(), RotationDecision::Rotate(1));
    }

    #[test]
    fn rotation_is_modular_from_any_start() {
        let mut coord = coordinator(FakeFactory::new(), 4);
        // Advance to index 2 first.
        coord.on_rate_limited();
        coord.on_rate_limited();
        assert_eq!(coord.current_index(), 2);

        assert_eq!(coord.on_rate_limited(), RotationDecision::Rotate(3));
        assert_eq!(coord.on_rate_limited(), RotationDecision::CooldownRequired);
        assert_eq!(coord.current_index(), 0);
    }

    #[test]
    fn single_credential_pool_goes_straight_to_cooldown() {
        let mut coord = coordinator(FakeFactory::new(), 1);
        assert_eq!(coord.on_rate_limited(), RotationDecision::CooldownRequired);
        assert_eq!(coord.current_index(), 0);
        // And again: rotation is never possible with one credential.
        assert_eq!(coord.on_rate_limited(), RotationDecision::CooldownRequired);
    }

    #[tokio::test]
    async fn session_is_opened_lazily_and_cached() {
        let factory = FakeFactory::new();
        let mut coord = coordinator(factory.clone(), 2);
        assert!(factory.opened().is_empty());

        coord.session().await.unwrap();
        coord.session().await.unwrap();
        assert_eq!(factory.opened(), vec![0], "second call must reuse the session");
    }

    #[tokio::test]
    async fn rotation_rebinds_session_to_new_credential() {
        let factory = FakeFactory::new();
        let mut coord = coordinator(factory.clone(), 3);

        coord.session().await.unwrap();
        assert_eq!(coord.on_rate_limited(), RotationDecision::Rotate(1));
        coord.session().await.unwrap();

        assert_eq!(factory.opened(), vec![0, 1]);
    }

    #[tokio::test]
    async fn cooldown_rebinds_credential_zero() {
        let factory = FakeFactory::new();
        let mut coord = coordinator(factory.clone(), 2);

        coord.session().await.unwrap();
        coord.on_rate_limited(); // Rotate(1)
        coord.session().await.unwrap();
        coord.on_rate_limited(); // CooldownRequired, back to 0
        coord.session().await.unwrap();

        assert_eq!(factory.opened(), vec![0, 1, 0]);
    }

    #[tokio::test]
    async fn session_fetch_reflects_bound_credential() {
        let factory = FakeFactory::new();
        let mut coord = coordinator(factory, 2);
        coord.on_rate_limited(); // now at index 1

        let session = coord.session().await.unwrap();
        let result = session.fetch_follows("42").await;
        assert_eq!(result, EdgeResult::Follows(vec![1]));
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_sleeps_for_configured_window() {
        let factory = FakeFactory::new();
        let coord =
            RateLimitCoordinator::new(factory, 1, Duration::from_secs(900)).unwrap();

        let before = tokio::time::Instant::now();
        coord.cooldown().await;
        assert_eq!(before.elapsed(), Duration::from_secs(900));
    }

    #[test]
    fn state_persists_across_users() {
        // There is deliberately no per-user reset: exhaustion detected on
        // one user carries into the next.
        let mut coord = coordinator(FakeFactory::new(), 3);
        coord.on_rate_limited(); // user A sees Rotate(1)
        // user B starts here, mid-cycle
        assert_eq!(coord.current_index(), 1);
        assert_eq!(coord.on_rate_limited(), RotationDecision::Rotate(2));
    }
}
