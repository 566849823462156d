use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

pub const DAILY_REQUEST_LIMIT: u32 = 5;

/// Quota decision handed to the request layer before the planning core runs.
/// The core itself never consults this service, keeping it stateless per
/// request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum QuotaDecision {
    Allowed { remaining: u32 },
    Denied { reset_date: NaiveDate },
}

#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStats {
    pub user_id: String,
    pub current_count: u32,
    pub limit: u32,
    pub remaining: u32,
    pub reset_date: NaiveDate,
}

/// In-memory per-day request counters keyed by caller identity. Counters for
/// past days are dropped opportunistically on access.
pub struct RateLimitService {
    limit: u32,
    counters: Mutex<HashMap<String, (NaiveDate, u32)>>,
}

impl RateLimitService {
    pub fn new(limit: u32) -> Self {
        Self { limit, counters: Mutex::new(HashMap::new()) }
    }

    pub fn check_quota(&self, user_id: &str) -> QuotaDecision {
        let today = Utc::now().date_naive();
        let mut counters = self.counters.lock().expect("rate limit lock");
        counters.retain(|_, (date, _)| *date == today);

        let count = counters
            .get(user_id)
            .filter(|(date, _)| *date == today)
            .map(|(_, count)| *count)
            .unwrap_or(0);

        if count >= self.limit {
            QuotaDecision::Denied { reset_date: today.succ_opt().unwrap_or(today) }
        } else {
            QuotaDecision::Allowed { remaining: self.limit - count }
        }
    }

    pub fn record_request(&self, user_id: &str) {
        let today = Utc::now().date_naive();
        let mut counters = self.counters.lock().expect("rate limit lock");
        let entry = counters.entry(user_id.to_string()).or_insert((today, 0));
        if entry.0 != today {
            *entry = (today, 0);
        }
        entry.1 += 1;
    }

    pub fn stats(&self, user_id: &str) -> RateLimitStats {
        let today = Utc::now().date_naive();
        let counters = self.counters.lock().expect("rate limit lock");
        let current_count = counters
            .get(user_id)
            .filter(|(date, _)| *date == today)
            .map(|(_, count)| *count)
            .unwrap_or(0);

        RateLimitStats {
            user_id: user_id.to_string(),
            current_count,
            limit: self.limit,
            remaining: self.limit.saturating_sub(current_count),
            reset_date: today.succ_opt().unwrap_or(today),
        }
    }
}

impl Default for RateLimitService {
    fn default() -> Self {
        Self::new(DAILY_REQUEST_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_until_the_daily_limit() {
        let service = RateLimitService::new(2);

        assert_eq!(service.check_quota("10.0.0.1"), QuotaDecision::Allowed { remaining: 2 });
        service.record_request("10.0.0.1");
        assert_eq!(service.check_quota("10.0.0.1"), QuotaDecision::Allowed { remaining: 1 });
        service.record_request("10.0.0.1");
        assert!(matches!(service.check_quota("10.0.0.1"), QuotaDecision::Denied { .. }));
    }

    #[test]
    fn users_are_tracked_independently() {
        let service = RateLimitService::new(1);
        service.record_request("10.0.0.1");

        assert!(matches!(service.check_quota("10.0.0.1"), QuotaDecision::Denied { .. }));
        assert!(matches!(service.check_quota("10.0.0.2"), QuotaDecision::Allowed { .. }));
    }

    #[test]
    fn stats_reflect_usage() {
        let service = RateLimitService::new(5);
        service.record_request("user");
        service.record_request("user");

        let stats = service.stats("user");
        assert_eq!(stats.current_count, 2);
        assert_eq!(stats.remaining, 3);
    }
}
