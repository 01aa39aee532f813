use linetail::{Error, Follower, Shutdown};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use tokio::time;

const TIMEOUT_2_SEC: Duration = Duration::from_millis(2000);
const POLL: Duration = Duration::from_millis(10);

#[tokio::test]
pub async fn test_backfill_then_follow() {
    let logdir = tempdir().unwrap();
    let logfile = logdir.path().join("abc.log");
    fs::write(&logfile, "a\nb\nc\n").unwrap();

    let mut follower = Follower::builder(&logfile)
        .poll_interval(POLL)
        .backfill(2)
        .build()
        .unwrap();
    let mut lines = follower.lines();
    follower.start().await.unwrap();

    for expected in ["b", "c"] {
        let line = time::timeout(TIMEOUT_2_SEC, lines.next_line())
            .await
            .unwrap();
        assert_eq!(line.as_deref(), Some(expected));
    }

    let mut f = OpenOptions::new().append(true).open(&logfile).unwrap();
    f.write_all(b"d\n").unwrap();

    let line = time::timeout(TIMEOUT_2_SEC, lines.next_line())
        .await
        .unwrap();
    assert_eq!(line.as_deref(), Some("d"));

    follower.stop().await.unwrap();
}

#[tokio::test]
pub async fn test_start_error_ends_sequence() {
    let logdir = tempdir().unwrap();
    let missing = logdir.path().join("missing.log");

    let mut follower = Follower::new(&missing).unwrap();
    let mut lines = follower.lines();

    match follower.start().await {
        Err(Error::Start { path, .. }) => assert_eq!(path, missing),
        other => panic!("unexpected start result: {:?}", other),
    }

    let end = time::timeout(TIMEOUT_2_SEC, lines.next_line()).await.unwrap();
    assert_eq!(end, None);
    assert!(matches!(follower.start().await, Err(Error::NotRestartable)));
}

#[tokio::test]
pub async fn test_stop_is_idempotent_and_final() {
    let logdir = tempdir().unwrap();
    let logfile = logdir.path().join("app.log");
    fs::write(&logfile, "one\ntwo\nthree\n").unwrap();

    // Smaller queue than backfill: the worker is blocked on a full queue when
    // stop is requested.
    let mut follower = Follower::builder(&logfile)
        .poll_interval(POLL)
        .buffer_size(1)
        .build()
        .unwrap();
    let mut lines = follower.lines();
    follower.start().await.unwrap();
    assert!(follower.is_running());

    time::sleep(POLL * 3).await;
    time::timeout(TIMEOUT_2_SEC, follower.stop())
        .await
        .unwrap()
        .unwrap();
    follower.stop().await.unwrap();
    assert!(!follower.is_running());

    // Already queued lines are still handed out, then the sequence ends.
    let mut rest = Vec::new();
    while let Some(line) = lines.next_line().await {
        rest.push(line);
    }
    assert!(rest.len() <= 1, "{:?}", rest);

    // A second call hands out an already ended sequence.
    assert_eq!(follower.lines().next_line().await, None);
}

#[tokio::test]
pub async fn test_shutdown_releases_blocked_consumer() {
    let logdir = tempdir().unwrap();
    let logfile = logdir.path().join("quiet.log");
    fs::write(&logfile, "").unwrap();

    let shutdown = Shutdown::new();
    let mut follower = Follower::builder(&logfile)
        .poll_interval(POLL)
        .build()
        .unwrap();
    let mut lines = follower.lines().until_shutdown(&shutdown);
    follower.start().await.unwrap();

    let consumer = tokio::spawn(async move {
        let mut count = 0;
        while lines.next_line().await.is_some() {
            count += 1;
        }
        count
    });

    time::sleep(POLL * 3).await;
    shutdown.trigger();

    let count = time::timeout(TIMEOUT_2_SEC, consumer)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(count, 0);

    // The shutdown never stops followers by itself.
    assert!(follower.is_running());
    follower.stop().await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
pub async fn test_transient_errors_reach_hook() {
    let logdir = tempdir().unwrap();
    let logfile = logdir.path().join("app.log");
    fs::write(&logfile, "").unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let hook_seen = seen.clone();

    let mut follower = Follower::builder(&logfile)
        .poll_interval(POLL)
        .on_transient_error(move |e| hook_seen.lock().unwrap().push(e.to_string()))
        .build()
        .unwrap();
    let mut lines = follower.lines();
    follower.start().await.unwrap();

    // Rotate to a directory: reopening fails with a non-NotFound error, which
    // is retried until a regular file shows up again.
    fs::rename(&logfile, logdir.path().join("app.log.1")).unwrap();
    fs::create_dir(&logfile).unwrap();
    time::sleep(POLL * 5).await;
    fs::remove_dir(&logfile).unwrap();
    fs::write(&logfile, "recovered\n").unwrap();

    let line = time::timeout(TIMEOUT_2_SEC, lines.next_line())
        .await
        .unwrap();
    assert_eq!(line.as_deref(), Some("recovered"));
    assert!(!seen.lock().unwrap().is_empty());

    follower.stop().await.unwrap();
}
