use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use thiserror::Error;

pub const CODE_TTL_SECS: i64 = 300;
pub const MAX_ATTEMPTS: u32 = 3;
pub const SWEEP_INTERVAL_SECS: u64 = 60;
const DEV_CODE: &str = "123456";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("验证码不存在或已过期")]
    NotFound,

    #[error("验证码已过期")]
    Expired,

    #[error("验证码错误次数过多，请重新获取")]
    TooManyAttempts,

    #[error("验证码错误")]
    Mismatch,
}

#[derive(Debug, Clone)]
struct CodeRecord {
    code: String,
    expires_at: DateTime<Utc>,
    attempts: u32,
}

/// Outstanding SMS codes keyed by phone number.
///
/// Codes live for [`CODE_TTL_SECS`], are consumed by a successful check and
/// are dropped after [`MAX_ATTEMPTS`] wrong guesses.
pub struct VerificationCodes {
    records: Mutex<HashMap<String, CodeRecord>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    dev_mode: bool,
}

impl VerificationCodes {
    pub fn new(clock: Arc<dyn Clock>, dev_mode: bool) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
            ttl: Duration::seconds(CODE_TTL_SECS),
            dev_mode,
        }
    }

    /// Creates a code for `phone`, replacing any earlier one.
    pub fn issue(&self, phone: &str) -> String {
        let code = if self.dev_mode {
            DEV_CODE.to_string()
        } else {
            rand::thread_rng().gen_range(100_000..=999_999).to_string()
        };

        let record = CodeRecord {
            code: code.clone(),
            expires_at: self.clock.now() + self.ttl,
            attempts: 0,
        };
        self.lock().insert(phone.to_string(), record);

        code
    }

    pub fn verify(&self, phone: &str, code: &str) -> Result<(), VerifyError> {
        let now = self.clock.now();
        let mut records = self.lock();

        let record = records.get_mut(phone).ok_or(VerifyError::NotFound)?;

        if now > record.expires_at {
            records.remove(phone);
            return Err(VerifyError::Expired);
        }

        if record.attempts >= MAX_ATTEMPTS {
            records.remove(phone);
            return Err(VerifyError::TooManyAttempts);
        }

        if record.code != code {
            record.attempts += 1;
            return Err(VerifyError::Mismatch);
        }

        records.remove(phone);
        Ok(())
    }

    /// Drops expired codes and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut records = self.lock();
        let before = records.len();
        records.retain(|_, record| record.expires_at >= now);
        before - records.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CodeRecord>> {
        // A panic while holding the lock cannot leave a record half-written.
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(Utc::now())))
        }

        fn advance(&self, secs: i64) {
            *self.0.lock().unwrap() += Duration::seconds(secs);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    const PHONE: &str = "13800138000";

    #[test]
    fn test_random_code_is_six_digits() {
        let codes = VerificationCodes::new(Arc::new(SystemClock), false);
        let code = codes.issue(PHONE);

        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
        assert!(!code.starts_with('0'));
    }

    #[test]
    fn test_code_is_single_use() {
        let codes = VerificationCodes::new(Arc::new(SystemClock), true);
        let code = codes.issue(PHONE);

        assert_eq!(code, "123456");
        assert_eq!(codes.verify(PHONE, &code), Ok(()));
        assert_eq!(codes.verify(PHONE, &code), Err(VerifyError::NotFound));
    }

    #[test]
    fn test_code_expires() {
        let clock = ManualClock::new();
        let codes = VerificationCodes::new(clock.clone(), true);
        codes.issue(PHONE);

        clock.advance(CODE_TTL_SECS + 1);

        assert_eq!(codes.verify(PHONE, "123456"), Err(VerifyError::Expired));
        assert!(codes.is_empty());
    }

    #[test]
    fn test_locks_after_three_wrong_attempts() {
        let codes = VerificationCodes::new(Arc::new(SystemClock), true);
        codes.issue(PHONE);

        for _ in 0..MAX_ATTEMPTS {
            assert_eq!(codes.verify(PHONE, "000000"), Err(VerifyError::Mismatch));
        }
        assert_eq!(
            codes.verify(PHONE, "123456"),
            Err(VerifyError::TooManyAttempts)
        );
        assert_eq!(codes.verify(PHONE, "123456"), Err(VerifyError::NotFound));
    }

    #[test]
    fn test_reissue_resets_attempts() {
        let codes = VerificationCodes::new(Arc::new(SystemClock), true);
        codes.issue(PHONE);
        codes.verify(PHONE, "000000").unwrap_err();
        codes.verify(PHONE, "000000").unwrap_err();

        codes.issue(PHONE);
        for _ in 0..MAX_ATTEMPTS - 1 {
            codes.verify(PHONE, "000000").unwrap_err();
        }
        assert_eq!(codes.verify(PHONE, "123456"), Ok(()));
    }

    #[test]
    fn test_purge_expired_keeps_live_codes() {
        let clock = ManualClock::new();
        let codes = VerificationCodes::new(clock.clone(), true);
        codes.issue("13800138000");
        clock.advance(200);
        codes.issue("13900139000");
        clock.advance(150);

        assert_eq!(codes.purge_expired(), 1);
        assert_eq!(codes.len(), 1);
        assert_eq!(codes.verify("13900139000", "123456"), Ok(()));
    }
}
