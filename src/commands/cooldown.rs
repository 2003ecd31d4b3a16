//! Per-command rate limiting.
//!
//! Each command owns one bucket per scope key (a chatter or a channel). A
//! bucket grants `uses` invocations, then refuses until `per` has elapsed
//! since the window opened. Refused attempts are dropped without a reply.

use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::Arc,
    time::{Duration, Instant},
};

use log::debug;
use tokio::{sync::Mutex, time};

use crate::commands::{CommandContext, command::Command};

/// Buckets idle for this many windows are removed by the sweep task.
const SWEEP_AFTER_WINDOWS: u32 = 10;

/// How many invocations are allowed per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    /// Invocations allowed in one window
    pub uses: u32,
    /// Length of a window
    pub per: Duration,
}

/// Who shares a cooldown bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CooldownScope {
    /// Every chatter has their own bucket, keyed by user id
    #[default]
    User,
    /// The whole channel shares one bucket
    Channel,
}

impl CooldownScope {
    fn key<'a>(&self, context: &'a CommandContext) -> &'a str {
        match self {
            CooldownScope::User => &context.sender_id,
            CooldownScope::Channel => &context.channel_login,
        }
    }
}

impl FromStr for CooldownScope {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "user" => Ok(CooldownScope::User),
            "channel" => Ok(CooldownScope::Channel),
            other => Err(other.to_owned()),
        }
    }
}

impl fmt::Display for CooldownScope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CooldownScope::User => write!(f, "user"),
            CooldownScope::Channel => write!(f, "channel"),
        }
    }
}

#[derive(Debug)]
struct Bucket {
    window_start: Instant,
    remaining: u32,
}

/// Idle time after which a bucket is swept, saturating on huge windows.
fn max_idle(policy: &CooldownPolicy) -> Duration {
    policy.per.saturating_mul(SWEEP_AFTER_WINDOWS)
}

impl Bucket {
    fn new(policy: &CooldownPolicy, now: Instant) -> Self {
        Bucket {
            window_start: now,
            remaining: policy.uses,
        }
    }

    fn try_consume(&mut self, policy: &CooldownPolicy, now: Instant) -> bool {
        if now.duration_since(self.window_start) >= policy.per {
            self.window_start = now;
            self.remaining = policy.uses;
        }

        if self.remaining == 0 {
            return false;
        }

        self.remaining -= 1;
        true
    }
}

/// Tracks cooldown buckets for every command and scope key.
///
/// Buckets are created on the first invocation and shared between the
/// message handling tasks behind a mutex.
pub struct CooldownTracker {
    /// `None` disables rate limiting
    policy: Option<CooldownPolicy>,
    scope: CooldownScope,
    buckets: Arc<Mutex<HashMap<(Command, String), Bucket>>>,
}

impl CooldownTracker {
    /// Creates a tracker with no bucket yet.
    pub fn new(policy: Option<CooldownPolicy>, scope: CooldownScope) -> Self {
        CooldownTracker {
            policy,
            scope,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Records an invocation attempt and tells whether it is allowed.
    pub async fn try_acquire(&self, command: Command, context: &CommandContext) -> bool {
        self.try_acquire_at(command, context, Instant::now()).await
    }

    async fn try_acquire_at(&self, command: Command, context: &CommandContext, now: Instant) -> bool {
        let Some(policy) = self.policy else {
            return true;
        };

        let key = (command, self.scope.key(context).to_owned());
        let mut buckets = self.buckets.lock().await;
        let bucket = buckets
            .entry(key)
            .or_insert_with(|| Bucket::new(&policy, now));

        bucket.try_consume(&policy, now)
    }

    /// Removes buckets whose window opened more than [`SWEEP_AFTER_WINDOWS`]
    /// windows ago and returns how many were removed.
    async fn sweep_at(&self, now: Instant) -> usize {
        let Some(policy) = self.policy else {
            return 0;
        };

        let max_idle = max_idle(&policy);
        let mut buckets = self.buckets.lock().await;
        let before = buckets.len();
        buckets.retain(|_, bucket| now.duration_since(bucket.window_start) < max_idle);

        before - buckets.len()
    }

    /// Starts a background task removing idle buckets.
    ///
    /// Runs every [`SWEEP_AFTER_WINDOWS`] windows until the process exits.
    /// Does nothing when rate limiting is disabled.
    pub fn start_sweep_task(self: &Arc<Self>) {
        let Some(policy) = self.policy else {
            return;
        };

        let tracker = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = time::interval(max_idle(&policy));
            loop {
                interval.tick().await;
                let removed = tracker.sweep_at(Instant::now()).await;
                if removed > 0 {
                    debug!("removed {} idle cooldown buckets", removed);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(uses: u32, secs: u64) -> Option<CooldownPolicy> {
        Some(CooldownPolicy {
            uses,
            per: Duration::from_secs(secs),
        })
    }

    fn context(sender_id: &str, channel: &str) -> CommandContext {
        CommandContext {
            channel_login: channel.to_string(),
            sender_id: sender_id.to_string(),
            sender_login: format!("user{}", sender_id),
        }
    }

    #[tokio::test]
    async fn test_second_invocation_in_window_is_refused() {
        let tracker = CooldownTracker::new(policy(1, 30), CooldownScope::User);
        let ctx = context("1", "chan");
        let now = Instant::now();

        assert!(tracker.try_acquire_at(Command::Rules, &ctx, now).await);
        assert!(
            !tracker
                .try_acquire_at(Command::Rules, &ctx, now + Duration::from_secs(10))
                .await
        );
    }

    #[tokio::test]
    async fn test_invocation_after_window_is_allowed() {
        let tracker = CooldownTracker::new(policy(1, 30), CooldownScope::User);
        let ctx = context("1", "chan");
        let now = Instant::now();

        assert!(tracker.try_acquire_at(Command::Rules, &ctx, now).await);
        assert!(
            !tracker
                .try_acquire_at(Command::Rules, &ctx, now + Duration::from_secs(29))
                .await
        );
        assert!(
            tracker
                .try_acquire_at(Command::Rules, &ctx, now + Duration::from_secs(30))
                .await
        );
    }

    #[tokio::test]
    async fn test_commands_have_independent_buckets() {
        let tracker = CooldownTracker::new(policy(1, 30), CooldownScope::User);
        let ctx = context("1", "chan");
        let now = Instant::now();

        assert!(tracker.try_acquire_at(Command::Rules, &ctx, now).await);
        assert!(tracker.try_acquire_at(Command::Shopping, &ctx, now).await);
        assert!(tracker.try_acquire_at(Command::Commands, &ctx, now).await);
    }

    #[tokio::test]
    async fn test_user_scope_separates_chatters() {
        let tracker = CooldownTracker::new(policy(1, 30), CooldownScope::User);
        let now = Instant::now();

        assert!(
            tracker
                .try_acquire_at(Command::Rules, &context("1", "chan"), now)
                .await
        );
        assert!(
            tracker
                .try_acquire_at(Command::Rules, &context("2", "chan"), now)
                .await
        );
    }

    #[tokio::test]
    async fn test_channel_scope_shares_bucket() {
        let tracker = CooldownTracker::new(policy(1, 30), CooldownScope::Channel);
        let now = Instant::now();

        assert!(
            tracker
                .try_acquire_at(Command::Rules, &context("1", "chan"), now)
                .await
        );
        assert!(
            !tracker
                .try_acquire_at(Command::Rules, &context("2", "chan"), now)
                .await
        );
        assert!(
            tracker
                .try_acquire_at(Command::Rules, &context("2", "other"), now)
                .await
        );
    }

    #[tokio::test]
    async fn test_multiple_uses_per_window() {
        let tracker = CooldownTracker::new(policy(2, 30), CooldownScope::User);
        let ctx = context("1", "chan");
        let now = Instant::now();

        assert!(tracker.try_acquire_at(Command::Rules, &ctx, now).await);
        assert!(tracker.try_acquire_at(Command::Rules, &ctx, now).await);
        assert!(!tracker.try_acquire_at(Command::Rules, &ctx, now).await);
    }

    #[tokio::test]
    async fn test_disabled_policy_always_allows() {
        let tracker = CooldownTracker::new(None, CooldownScope::User);
        let ctx = context("1", "chan");

        for _ in 0..5 {
            assert!(tracker.try_acquire(Command::Rules, &ctx).await);
        }
        assert_eq!(tracker.sweep_at(Instant::now()).await, 0);
    }

    #[tokio::test]
    async fn test_sweep_removes_idle_buckets_only() {
        let tracker = CooldownTracker::new(policy(1, 30), CooldownScope::User);
        let start = Instant::now();

        tracker
            .try_acquire_at(Command::Rules, &context("1", "chan"), start)
            .await;
        tracker
            .try_acquire_at(
                Command::Rules,
                &context("2", "chan"),
                start + Duration::from_secs(200),
            )
            .await;

        let removed = tracker.sweep_at(start + Duration::from_secs(300)).await;
        assert_eq!(removed, 1);
        assert_eq!(tracker.buckets.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_with_huge_window_keeps_buckets() {
        let tracker = CooldownTracker::new(policy(1, u64::MAX), CooldownScope::User);
        let start = Instant::now();

        assert!(
            tracker
                .try_acquire_at(Command::Rules, &context("1", "chan"), start)
                .await
        );
        assert_eq!(max_idle(&tracker.policy.unwrap()), Duration::MAX);
        assert_eq!(tracker.sweep_at(start + Duration::from_secs(300)).await, 0);
    }

    #[test]
    fn test_scope_from_str() {
        assert_eq!("user".parse::<CooldownScope>(), Ok(CooldownScope::User));
        assert_eq!(" Channel ".parse::<CooldownScope>(), Ok(CooldownScope::Channel));
        assert_eq!("room".parse::<CooldownScope>(), Err("room".to_string()));
    }
}
