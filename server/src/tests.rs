use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use chrono::{Days, NaiveDate};
use futures::future::join_all;
use shared::{LeaderboardEntry, LightSwitch, ManualClock};

use crate::{
    auth::{Session, SessionToken, TokenIssuer},
    config::Env,
    db::{AccountStore, MemoryDB},
    error::ServiceError,
    tracker::Tracker,
};

pub const SECRET: &str = "correct horse battery staple";

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

pub fn test_env() -> Env {
    Env::default().with_password_hash_cost(8, 1)
}

pub struct TrackerExt {
    pub tracker: Arc<Tracker>,
    pub clock: Arc<ManualClock>,
    pub db: Arc<MemoryDB>,
}

impl TrackerExt {
    pub fn new() -> Self {
        Self::with_env(test_env())
    }

    pub fn with_env(env: Env) -> Self {
        let clock = Arc::new(ManualClock::new(start_date()));
        let db = Arc::new(MemoryDB::new());
        let tracker = Tracker::new(env)
            .unwrap()
            .with_clock(clock.clone())
            .with_store(db.clone());

        Self {
            tracker: Arc::new(tracker),
            clock,
            db,
        }
    }

    pub async fn signup(&self, username: &str) -> Session {
        self.tracker.register(username, SECRET).await.unwrap();
        self.login(username).await
    }

    pub async fn login(&self, username: &str) -> Session {
        let (_, token) = self.tracker.login(username, SECRET).await.unwrap();
        self.tracker.resolve(token.as_str()).await.unwrap()
    }

    pub async fn bump(&self, session: &Session, switch: LightSwitch, times: usize) {
        for _ in 0..times {
            self.tracker.increment(session, switch).await.unwrap();
        }
    }

    pub async fn complete_day(&self, session: &Session) {
        self.tracker.set_challenge(session, 0, true).await.unwrap();
        self.tracker.set_challenge(session, 1, true).await.unwrap();
    }

    pub fn next_day(&self) {
        self.clock.advance_days(1);
    }
}

fn entry(username: &str, currently_on: u64) -> LeaderboardEntry {
    LeaderboardEntry {
        username: username.to_string(),
        currently_on,
    }
}

#[rocket::async_test]
async fn friends_leaderboard_includes_caller() {
    let ext = TrackerExt::new();
    let alice = ext.signup("alice").await;
    let bob = ext.signup("bob").await;

    ext.bump(&alice, LightSwitch::Off, 3).await;
    ext.bump(&alice, LightSwitch::On, 1).await;
    ext.bump(&bob, LightSwitch::On, 5).await;
    ext.bump(&bob, LightSwitch::Off, 1).await;

    ext.tracker.add_friend(&alice, "bob").await.unwrap();

    let board = ext.tracker.friends_leaderboard(&alice).await.unwrap();
    assert_eq!(board, vec![entry("bob", 4), entry("alice", 0)]);

    // Friendship is one-directional
    let board = ext.tracker.friends_leaderboard(&bob).await.unwrap();
    assert_eq!(board, vec![entry("bob", 4)]);
}

#[rocket::async_test]
async fn add_friend_is_idempotent() {
    let ext = TrackerExt::new();
    let alice = ext.signup("alice").await;
    ext.signup("bob").await;

    ext.tracker.add_friend(&alice, "bob").await.unwrap();
    ext.tracker.add_friend(&alice, "bob").await.unwrap();

    let account = ext.tracker.me(&alice).await.unwrap();
    assert_eq!(account.friends.len(), 1);

    let board = ext.tracker.friends_leaderboard(&alice).await.unwrap();
    assert_eq!(board.iter().filter(|e| e.username == "bob").count(), 1);
}

#[rocket::async_test]
async fn add_friend_rejections() {
    let ext = TrackerExt::new();
    let alice = ext.signup("alice").await;

    assert!(matches!(
        ext.tracker.add_friend(&alice, "alice").await,
        Err(ServiceError::InvalidArgument(_))
    ));
    assert!(matches!(
        ext.tracker.add_friend(&alice, "ghost").await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        ext.tracker.add_friend(&alice, "").await,
        Err(ServiceError::BadRequest(_))
    ));
    assert!(ext.tracker.me(&alice).await.unwrap().friends.is_empty());
}

#[rocket::async_test]
async fn second_login_revokes_first_token() {
    let ext = TrackerExt::new();
    ext.tracker.register("alice", SECRET).await.unwrap();

    let (_, first) = ext.tracker.login("alice", SECRET).await.unwrap();
    let first_session = ext.tracker.resolve(first.as_str()).await.unwrap();
    let (_, second) = ext.tracker.login("alice", SECRET).await.unwrap();
    assert_ne!(first, second);

    assert!(matches!(
        ext.tracker.resolve(first.as_str()).await,
        Err(ServiceError::Unauthorized)
    ));
    // A session resolved before the second login dies with it
    assert!(matches!(
        ext.tracker.increment(&first_session, LightSwitch::On).await,
        Err(ServiceError::Unauthorized)
    ));
    assert_eq!(ext.db.session_owner(&first).await.unwrap(), None);

    let session = ext.tracker.resolve(second.as_str()).await.unwrap();
    assert_eq!(session.username(), "alice");
    assert_eq!(ext.tracker.me(&session).await.unwrap().on_count, 0);
}

#[rocket::async_test]
async fn strict_login_policy() {
    let ext = TrackerExt::new();

    assert!(matches!(
        ext.tracker.login("alice", SECRET).await,
        Err(ServiceError::NotFound(_))
    ));
    // The failed login did not create the account
    assert!(ext.db.get("alice").await.unwrap().is_none());

    ext.tracker.register("alice", SECRET).await.unwrap();
    assert!(matches!(
        ext.tracker.register("alice", "another").await,
        Err(ServiceError::AlreadyExists(_))
    ));
    assert!(matches!(
        ext.tracker.login("alice", "wrong").await,
        Err(ServiceError::InvalidCredential)
    ));
    // The first secret survived the duplicate registration
    assert!(ext.tracker.login("alice", SECRET).await.is_ok());
}

#[rocket::async_test]
async fn register_returns_fresh_account() {
    let ext = TrackerExt::new();
    let account = ext.tracker.register("alice", SECRET).await.unwrap();

    assert_eq!(account.username, "alice");
    assert_eq!((account.on_count, account.off_count), (0, 0));
    assert!(!account.driving_minimized);
    assert!(account.friends.is_empty());
    assert!(account.active_token.is_none());
}

#[rocket::async_test]
async fn logout_twice_is_unauthorized() {
    let ext = TrackerExt::new();
    let alice = ext.signup("alice").await;
    let token = alice.token().clone();

    ext.tracker.logout(&alice).await.unwrap();
    assert!(matches!(
        ext.tracker.logout(&alice).await,
        Err(ServiceError::Unauthorized)
    ));
    assert!(matches!(
        ext.tracker.resolve(token.as_str()).await,
        Err(ServiceError::Unauthorized)
    ));
    assert!(ext.tracker.me(&alice).await.is_err());
}

#[rocket::async_test]
async fn garbage_tokens_are_unauthorized() {
    let ext = TrackerExt::new();
    ext.signup("alice").await;

    for token in ["", "alice", "alice_token_1700000000000", "00ff"] {
        assert!(matches!(
            ext.tracker.resolve(token).await,
            Err(ServiceError::Unauthorized)
        ));
    }
}

struct SequenceIssuer(AtomicU64);

impl TokenIssuer for SequenceIssuer {
    fn issue(&self) -> SessionToken {
        SessionToken::from(format!("token-{}", self.0.fetch_add(1, Ordering::SeqCst)))
    }
}

#[rocket::async_test]
async fn tokens_come_from_the_configured_issuer() {
    let tracker = Tracker::new(test_env())
        .unwrap()
        .with_token_issuer(Arc::new(SequenceIssuer(AtomicU64::new(1))));
    tracker.register("alice", SECRET).await.unwrap();
    tracker.register("bob", SECRET).await.unwrap();

    let (_, alice) = tracker.login("alice", SECRET).await.unwrap();
    let (_, bob) = tracker.login("bob", SECRET).await.unwrap();
    assert_eq!(alice.as_str(), "token-1");
    assert_eq!(bob.as_str(), "token-2");

    assert_eq!(tracker.resolve("token-2").await.unwrap().username(), "bob");
}

#[rocket::async_test]
async fn counters_and_drive_toggle() {
    let ext = TrackerExt::new();
    let alice = ext.signup("alice").await;

    assert_eq!(
        ext.tracker.increment(&alice, LightSwitch::On).await.unwrap(),
        (1, 0)
    );
    assert_eq!(
        ext.tracker.increment(&alice, LightSwitch::Off).await.unwrap(),
        (1, 1)
    );

    assert!(ext.tracker.toggle_drive(&alice).await.unwrap());
    assert!(!ext.tracker.toggle_drive(&alice).await.unwrap());
    assert!(!ext.tracker.me(&alice).await.unwrap().driving_minimized);
}

#[rocket::async_test]
async fn currently_on_is_floored_at_zero() {
    let ext = TrackerExt::new();
    let alice = ext.signup("alice").await;

    let pattern = [
        LightSwitch::Off,
        LightSwitch::On,
        LightSwitch::Off,
        LightSwitch::Off,
        LightSwitch::On,
        LightSwitch::On,
        LightSwitch::On,
        LightSwitch::On,
        LightSwitch::Off,
    ];
    let (mut on, mut off) = (0u64, 0u64);
    for switch in pattern {
        ext.tracker.increment(&alice, switch).await.unwrap();
        match switch {
            LightSwitch::On => on += 1,
            LightSwitch::Off => off += 1,
        }

        let board = ext.tracker.global_leaderboard().await.unwrap();
        assert_eq!(board[0].currently_on, on.saturating_sub(off));
    }
}

#[rocket::async_test]
async fn concurrent_increments_are_not_lost() {
    let ext = TrackerExt::new();
    let alice = Arc::new(ext.signup("alice").await);

    let tasks = (0..64).map(|i| {
        let tracker = ext.tracker.clone();
        let alice = alice.clone();
        let switch = if i % 4 == 0 {
            LightSwitch::Off
        } else {
            LightSwitch::On
        };
        rocket::tokio::spawn(async move { tracker.increment(&alice, switch).await })
    });
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let account = ext.tracker.me(&alice).await.unwrap();
    assert_eq!(account.on_count, 48);
    assert_eq!(account.off_count, 16);
}

#[rocket::async_test]
async fn global_leaderboard_tie_break_is_stable() {
    let ext = TrackerExt::new();
    for name in ["dave", "carol", "bob", "alice"] {
        let session = ext.signup(name).await;
        let on = if name == "dave" { 1 } else { 2 };
        ext.bump(&session, LightSwitch::On, on).await;
    }

    let expected = vec![
        entry("alice", 2),
        entry("bob", 2),
        entry("carol", 2),
        entry("dave", 1),
    ];
    for _ in 0..5 {
        assert_eq!(ext.tracker.global_leaderboard().await.unwrap(), expected);
    }
}

#[rocket::async_test]
async fn global_scan_respects_deadline() {
    let ext = TrackerExt::with_env(test_env().with_leaderboard_deadline_ms(50));
    ext.signup("alice").await;

    let handle = ext.db.get("alice").await.unwrap().unwrap();
    let held = handle.lock().await;
    assert!(matches!(
        ext.tracker.global_leaderboard().await,
        Err(ServiceError::DeadlineExceeded)
    ));
    drop(held);

    assert_eq!(ext.tracker.global_leaderboard().await.unwrap().len(), 1);
}

#[rocket::async_test]
async fn statistics_over_population() {
    let ext = TrackerExt::new();
    for (name, on) in [("alice", 1), ("bob", 3), ("carol", 8)] {
        let session = ext.signup(name).await;
        ext.bump(&session, LightSwitch::On, on).await;
    }

    let stats = ext.tracker.statistics().await.unwrap();
    assert_eq!(stats.total_players, 3);
    assert_eq!(stats.top, 8);
    assert_eq!(stats.median, 3.0);
    assert_eq!(stats.average, 4.0);
    assert_eq!(stats.top_players[0].username, "carol");
}

#[rocket::async_test]
async fn streak_follows_server_days() {
    let ext = TrackerExt::new();
    let alice = ext.signup("alice").await;

    ext.complete_day(&alice).await;
    assert_eq!(ext.tracker.streak(&alice).await.unwrap().streak.amount, 1);

    ext.next_day();
    ext.complete_day(&alice).await;
    assert_eq!(ext.tracker.streak(&alice).await.unwrap().streak.amount, 2);

    // Skip a day
    ext.next_day();
    ext.next_day();
    ext.complete_day(&alice).await;
    let streak = ext.tracker.streak(&alice).await.unwrap().streak;
    assert_eq!(streak.amount, 1);
    assert_eq!(streak.best, 2);
    assert_eq!(
        streak.last_completion,
        start_date().checked_add_days(Days::new(3))
    );
}

#[rocket::async_test]
async fn same_day_completion_counts_once() {
    let ext = TrackerExt::new();
    let alice = ext.signup("alice").await;

    ext.complete_day(&alice).await;
    ext.complete_day(&alice).await;
    ext.tracker.set_challenge(&alice, 0, false).await.unwrap();
    let day = ext.tracker.set_challenge(&alice, 0, true).await.unwrap();

    assert!(day.completed);
    assert_eq!(day.streak.amount, 1);
}

#[rocket::async_test]
async fn concurrent_completion_counts_once() {
    let ext = TrackerExt::new();
    let alice = Arc::new(ext.signup("alice").await);
    ext.tracker.set_challenge(&alice, 0, true).await.unwrap();

    let tasks = (0..8).map(|_| {
        let tracker = ext.tracker.clone();
        let alice = alice.clone();
        rocket::tokio::spawn(async move { tracker.set_challenge(&alice, 1, true).await })
    });
    for result in join_all(tasks).await {
        assert!(result.unwrap().unwrap().completed);
    }

    assert_eq!(ext.tracker.streak(&alice).await.unwrap().streak.amount, 1);
}

#[rocket::async_test]
async fn checklist_rolls_over_at_midnight() {
    let ext = TrackerExt::new();
    let alice = ext.signup("alice").await;
    ext.complete_day(&alice).await;

    ext.next_day();
    let day = ext.tracker.challenges(&alice).await.unwrap();
    assert_eq!(day.date, start_date().checked_add_days(Days::new(1)).unwrap());
    assert_eq!(day.flags, vec![false, false]);
    assert!(!day.completed);
    assert_eq!(day.streak.current(day.date), 1);

    assert!(matches!(
        ext.tracker.set_challenge(&alice, 5, true).await,
        Err(ServiceError::BadRequest(_))
    ));
}

#[rocket::async_test]
async fn racing_login_never_sees_half_registered_account() {
    let ext = TrackerExt::new();

    let register = {
        let tracker = ext.tracker.clone();
        rocket::tokio::spawn(async move { tracker.register("alice", SECRET).await })
    };
    let logins = (0..16).map(|_| {
        let tracker = ext.tracker.clone();
        rocket::tokio::spawn(async move { tracker.login("alice", SECRET).await })
    });
    let logins = join_all(logins).await;
    register.await.unwrap().unwrap();

    for login in logins {
        match login.unwrap() {
            Ok(_) | Err(ServiceError::NotFound(_)) => {}
            Err(e) => panic!("login during registration failed with {e:?}"),
        }
    }
    ext.login("alice").await;
}

#[rocket::async_test]
async fn concurrent_registration_has_one_winner() {
    let ext = TrackerExt::new();

    let attempts = ["first", "second", "third"].map(|secret| {
        let tracker = ext.tracker.clone();
        rocket::tokio::spawn(async move { (secret, tracker.register("alice", secret).await) })
    });
    let mut winners = Vec::new();
    for attempt in join_all(attempts).await {
        let (secret, result) = attempt.unwrap();
        match result {
            Ok(_) => winners.push(secret),
            Err(e) => assert!(matches!(e, ServiceError::AlreadyExists(_))),
        }
    }

    assert_eq!(winners.len(), 1);
    assert!(ext.tracker.login("alice", winners[0]).await.is_ok());
}

#[rocket::async_test]
async fn streak_is_read_against_one_date() {
    let ext = TrackerExt::new();
    let alice = ext.signup("alice").await;
    ext.complete_day(&alice).await;

    let day = ext.tracker.streak(&alice).await.unwrap();
    ext.next_day();
    ext.next_day();

    // The snapshot keeps the date it was read for
    assert_eq!(day.date, start_date());
    assert_eq!(day.streak.current(day.date), 1);
    assert!(day.streak.achieved_on(day.date));

    let later = ext.tracker.streak(&alice).await.unwrap();
    assert_eq!(later.date, ext.tracker.today());
    assert_eq!(later.streak.current(later.date), 0);
    assert!(!later.streak.achieved_on(later.date));
}
