use rocket::fairing::{Fairing, Info, Kind};
use rocket::tokio;
use rocket::{Orbit, Rocket};
use std::sync::Arc;

use crate::session::FormSessions;

pub struct BackgroundTasks;

#[rocket::async_trait]
impl Fairing for BackgroundTasks {
    fn info(&self) -> Info {
        Info {
            name: "Background Tasks",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let Some(sessions) = rocket.state::<Arc<FormSessions>>() else {
            log::error!("[task] Form sessions not in managed state, cleanup disabled");
            return;
        };

        // Stale form instance and rate limit cleanup
        let s = Arc::clone(sessions);
        tokio::spawn(async move {
            let interval = s.settings().cleanup_interval;
            let max_age = s.settings().session_max_age;
            let throttle = s.settings().options.limit_rate.as_ref().map(|l| l.throttle);
            loop {
                tokio::time::sleep(interval).await;
                if let Some(throttle) = throttle {
                    s.limiter().cleanup(throttle);
                }
                let count = s.cleanup(max_age);
                if count > 0 {
                    log::info!(
                        "[task] Dropped {} idle form instances ({} active)",
                        count,
                        s.len()
                    );
                }
            }
        });

        log::info!("[task] Background tasks started");
    }
}
