// src/services/usage.rs
//
// Daily-reset usage accounting. A counter is a valid reading only while its
// reset date equals the current UTC date; any other stored date means the
// effective count is zero and the next recorded action restarts the window.

use std::sync::Arc;

use chrono::Utc;

use eunoia_common::models::{MeteredAction, SubscriptionTier, User};
use eunoia_common::Error;

use crate::repositories::UserRepo;

/// Free tier: hard stop on daily chat messages.
pub const FREE_DAILY_CHAT_LIMIT: i64 = 30;
/// Plus tier: soft ceiling; the action is still permitted with a warning.
pub const PLUS_DAILY_CHAT_SOFT_LIMIT: i64 = 60;
/// Free tier: hard stop on daily emotion reports.
pub const FREE_DAILY_REPORT_LIMIT: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageDecision {
    Allowed,
    AllowedWithWarning(String),
    Denied(String),
}

/// Current UTC calendar date, the day-boundary convention for all counters.
pub fn today_utc() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

pub fn effective_count(count: i64, reset_date: Option<&str>, today: &str) -> i64 {
    if reset_date == Some(today) {
        count
    } else {
        0
    }
}

pub fn check(user: &User, action: MeteredAction, today: &str) -> UsageDecision {
    match action {
        MeteredAction::ChatMessage => {
            let count = effective_count(
                user.daily_chat_count,
                user.daily_chat_reset_date.as_deref(),
                today,
            );
            match user.subscription_tier {
                SubscriptionTier::Free if count >= FREE_DAILY_CHAT_LIMIT => {
                    UsageDecision::Denied("今日对话次数已用完。升级Plus可享受无限对话。".to_string())
                }
                SubscriptionTier::Plus if count >= PLUS_DAILY_CHAT_SOFT_LIMIT => {
                    UsageDecision::AllowedWithWarning(
                        "您当前使用频率较高，已进入排队状态，响应可能稍慢。".to_string(),
                    )
                }
                _ => UsageDecision::Allowed,
            }
        }
        MeteredAction::EmotionReport => {
            let count = effective_count(
                user.daily_report_count,
                user.daily_report_reset_date.as_deref(),
                today,
            );
            match user.subscription_tier {
                SubscriptionTier::Free if count >= FREE_DAILY_REPORT_LIMIT => {
                    UsageDecision::Denied("今日分析次数已用完。升级Plus可无限次分析。".to_string())
                }
                _ => UsageDecision::Allowed,
            }
        }
    }
}

pub struct UsageService {
    users: Arc<dyn UserRepo>,
}

impl UsageService {
    pub fn new(users: Arc<dyn UserRepo>) -> Self {
        Self { users }
    }

    /// Evaluate a metered action against today's window without mutating it.
    pub async fn authorize(
        &self,
        user_id: i64,
        action: MeteredAction,
    ) -> Result<UsageDecision, Error> {
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", user_id)))?;
        Ok(check(&user, action, &today_utc()))
    }

    /// Count a successful metered action against today's window.
    pub async fn record(&self, user_id: i64, action: MeteredAction) -> Result<(), Error> {
        self.users.record_usage(user_id, action, &today_utc()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(tier: SubscriptionTier, chat_count: i64, reset_date: Option<&str>) -> User {
        User {
            id: 1,
            email: "a@example.com".to_string(),
            password_hash: None,
            nickname: None,
            full_name: None,
            avatar_url: None,
            bio: None,
            subscription_tier: tier,
            daily_chat_count: chat_count,
            daily_chat_reset_date: reset_date.map(String::from),
            daily_report_count: 0,
            daily_report_reset_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn free_tier_is_refused_at_the_chat_ceiling() {
        let u = user(SubscriptionTier::Free, 30, Some("2025-06-01"));
        let decision = check(&u, MeteredAction::ChatMessage, "2025-06-01");
        assert!(matches!(decision, UsageDecision::Denied(_)));
    }

    #[test]
    fn stale_reset_date_counts_as_zero() {
        let u = user(SubscriptionTier::Free, 30, Some("2025-05-31"));
        let decision = check(&u, MeteredAction::ChatMessage, "2025-06-01");
        assert_eq!(decision, UsageDecision::Allowed);
    }

    #[test]
    fn missing_reset_date_counts_as_zero() {
        let u = user(SubscriptionTier::Free, 30, None);
        assert_eq!(effective_count(30, None, "2025-06-01"), 0);
        assert_eq!(check(&u, MeteredAction::ChatMessage, "2025-06-01"), UsageDecision::Allowed);
    }

    #[test]
    fn plus_tier_gets_a_warning_past_the_soft_ceiling() {
        let u = user(SubscriptionTier::Plus, 60, Some("2025-06-01"));
        let decision = check(&u, MeteredAction::ChatMessage, "2025-06-01");
        assert!(matches!(decision, UsageDecision::AllowedWithWarning(_)));
    }

    #[test]
    fn free_tier_gets_one_report_per_day() {
        let mut u = user(SubscriptionTier::Free, 0, None);
        u.daily_report_count = 1;
        u.daily_report_reset_date = Some("2025-06-01".to_string());
        let decision = check(&u, MeteredAction::EmotionReport, "2025-06-01");
        assert!(matches!(decision, UsageDecision::Denied(_)));

        // Plus reports are uncapped.
        u.subscription_tier = SubscriptionTier::Plus;
        u.daily_report_count = 99;
        assert_eq!(check(&u, MeteredAction::EmotionReport, "2025-06-01"), UsageDecision::Allowed);
    }
}
