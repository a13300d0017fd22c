use crate::supabase::{refresh_session, SUPABASE_SESSION};
use std::thread;
use std::time::{Duration, SystemTime};
use tokio::time::sleep;

// refresh this long before the access token expires
const REFRESH_MARGIN_SECONDS: u32 = 120;

/// Keeps the pinned caller session alive by exchanging the refresh token
/// before the access token expires. Runs on its own thread until the
/// process exits; does nothing while no session is pinned.
pub fn session_refresh_loop() {
    thread::spawn(move || {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .enable_io()
            .build()
            .unwrap()
            .block_on(async {
                loop {
                    let timestamp = SystemTime::now()
                        .duration_since(SystemTime::UNIX_EPOCH)
                        .unwrap()
                        .as_secs() as u32;
                    let expiry = SUPABASE_SESSION
                        .get_ref()
                        .map(|it| it.timestamp + it.expires_in);
                    let mut success = true;
                    if let Some(expiry) = expiry {
                        if timestamp + REFRESH_MARGIN_SECONDS > expiry
                            && refresh_session(timestamp).await.is_none()
                        {
                            success = false;
                        }
                    }
                    sleep(Duration::from_secs(if success {
                        (30 + fastrand::i8(-5..5)) as u64
                    } else {
                        (5 + fastrand::i8(-2..2)) as u64
                    }))
                    .await;
                }
            })
    });
}
