//! Readiness reporting and request counters shared by the store and chat clients.

use serde::Serialize;

pub const STORE_REQUESTS: &str = "fitcoach_store_requests_total";
pub const CHAT_COMPLETIONS: &str = "fitcoach_chat_completions_total";

#[derive(Clone, Debug, Serialize)]
pub struct Health {
    pub ready: bool,
    pub coach_enabled: bool,
}

impl Health {
    pub fn readiness(coach_enabled: bool) -> Self {
        Self {
            ready: true,
            coach_enabled,
        }
    }
}

pub fn record_store_request(table: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!(STORE_REQUESTS, "table" => table, "outcome" => outcome).increment(1);
}

pub fn record_chat_completion(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!(CHAT_COMPLETIONS, "outcome" => outcome).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readiness_ok() {
        let h = Health::readiness(false);
        assert!(h.ready);
        assert!(!h.coach_enabled);
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        record_store_request("workouts", true);
        record_chat_completion(false);
    }
}
