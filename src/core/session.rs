use crate::core::{CheckoutState, Step};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_ERROR_CLEAR: Duration = Duration::from_millis(3000);

/// 暫時性的欄位錯誤標記，到期後自動失效
#[derive(Debug, Clone)]
pub struct FieldErrors {
    expires_at: HashMap<String, Instant>,
    ttl: Duration,
}

impl FieldErrors {
    pub fn new(ttl: Duration) -> Self {
        Self {
            expires_at: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn mark(&mut self, field: &str, now: Instant) {
        self.expires_at.insert(field.to_string(), now + self.ttl);
    }

    pub fn clear(&mut self, field: &str) {
        self.expires_at.remove(field);
    }

    pub fn is_flagged(&self, field: &str, now: Instant) -> bool {
        self.expires_at.get(field).is_some_and(|expiry| *expiry > now)
    }

    /// 目前仍有效的標記（已排序）
    pub fn active(&self, now: Instant) -> Vec<String> {
        let mut fields: Vec<String> = self
            .expires_at
            .iter()
            .filter(|(_, expiry)| **expiry > now)
            .map(|(field, _)| field.clone())
            .collect();
        fields.sort();
        fields
    }

    pub fn purge_expired(&mut self, now: Instant) {
        self.expires_at.retain(|_, expiry| *expiry > now);
    }
}

impl Default for FieldErrors {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_CLEAR)
    }
}

/// 一次結帳頁面載入的狀態；離開頁面即丟棄
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    state: CheckoutState,
    field_errors: FieldErrors,
}

impl CheckoutSession {
    pub fn new(error_ttl: Duration) -> Self {
        Self {
            state: CheckoutState::Editing(Step::Contact),
            field_errors: FieldErrors::new(error_ttl),
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: CheckoutState) {
        self.state = state;
    }

    /// 送出後停留在最後一步
    pub fn current_step(&self) -> Step {
        match self.state {
            CheckoutState::Editing(step) => step,
            CheckoutState::Submitting | CheckoutState::Completed => Step::Review,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, CheckoutState::Editing(_))
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub(crate) fn field_errors_mut(&mut self) -> &mut FieldErrors {
        &mut self.field_errors
    }
}

impl Default for CheckoutSession {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_CLEAR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_marks_expire_after_ttl() {
        let mut errors = FieldErrors::new(Duration::from_millis(3000));
        errors.mark("email", Instant::now());

        assert!(errors.is_flagged("email", Instant::now()));
        tokio::time::advance(Duration::from_millis(2999)).await;
        assert_eq!(errors.active(Instant::now()), vec!["email".to_string()]);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(!errors.is_flagged("email", Instant::now()));
        assert!(errors.active(Instant::now()).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remarking_extends_expiry() {
        let mut errors = FieldErrors::default();
        errors.mark("phone", Instant::now());
        tokio::time::advance(Duration::from_millis(2000)).await;
        errors.mark("phone", Instant::now());
        tokio::time::advance(Duration::from_millis(2000)).await;

        assert!(errors.is_flagged("phone", Instant::now()));
        errors.purge_expired(Instant::now());
        errors.clear("phone");
        assert!(errors.active(Instant::now()).is_empty());
    }

    #[test]
    fn test_new_session_starts_on_contact_step() {
        let session = CheckoutSession::default();
        assert_eq!(session.state(), CheckoutState::Editing(Step::Contact));
        assert_eq!(session.current_step(), Step::Contact);
        assert!(session.is_editing());
    }
}
