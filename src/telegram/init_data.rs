//! Init data validation
//!
//! Telegram signs the launch parameters with
//! `HMAC_SHA256(secret_key, data_check_string)` where
//! `secret_key = HMAC_SHA256("WebAppData", bot_token)` and the data check
//! string is every `key=value` pair except `hash`, sorted by key and joined
//! with `\n`.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::TelegramUser;
use crate::constants::{INIT_DATA_CLOCK_SKEW_SECS, WEB_APP_DATA_KEY};

type HmacSha256 = Hmac<Sha256>;

/// Init data validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitDataError {
    #[error("init data is empty")]
    Empty,

    #[error("hash parameter is missing")]
    MissingHash,

    #[error("hash parameter is malformed")]
    InvalidHash,

    #[error("duplicate parameter: {0}")]
    DuplicateKey(String),

    #[error("signature does not match")]
    SignatureMismatch,

    #[error("auth_date parameter is missing")]
    MissingAuthDate,

    #[error("auth_date parameter is invalid")]
    InvalidAuthDate,

    #[error("init data has expired")]
    Expired,

    #[error("user parameter is missing")]
    MissingUser,

    #[error("user parameter is invalid: {0}")]
    InvalidUser(String),
}

/// Verified launch parameters
#[derive(Debug, Clone)]
pub struct InitData {
    pub user: TelegramUser,
    pub auth_date: DateTime<Utc>,
    pub query_id: Option<String>,
    pub start_param: Option<String>,
    pub chat_type: Option<String>,
    pub chat_instance: Option<String>,
}

/// Verifies init data against a bot token
#[derive(Clone)]
pub struct InitDataValidator {
    secret_key: Vec<u8>,
    max_age: Option<Duration>,
}

impl InitDataValidator {
    /// Create a validator. A `max_age_secs` of 0 disables the freshness check.
    pub fn new(bot_token: &str, max_age_secs: i64) -> Self {
        Self {
            secret_key: secret_key(bot_token),
            max_age: (max_age_secs > 0).then(|| Duration::seconds(max_age_secs)),
        }
    }

    /// Validate against the current time
    pub fn validate(&self, raw: &str) -> Result<InitData, InitDataError> {
        self.validate_at(raw, Utc::now())
    }

    /// Validate as of `now`
    pub fn validate_at(&self, raw: &str, now: DateTime<Utc>) -> Result<InitData, InitDataError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(InitDataError::Empty);
        }

        let mut params = parse_pairs(raw)?;

        let hash = params.remove("hash").ok_or(InitDataError::MissingHash)?;
        let signature = hex::decode(&hash).map_err(|_| InitDataError::InvalidHash)?;
        if signature.len() != 32 {
            return Err(InitDataError::InvalidHash);
        }

        let mut mac = self.mac();
        mac.update(data_check_string(&params).as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| InitDataError::SignatureMismatch)?;

        let auth_date = params
            .get("auth_date")
            .ok_or(InitDataError::MissingAuthDate)?
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or(InitDataError::InvalidAuthDate)?;

        if auth_date - now > Duration::seconds(INIT_DATA_CLOCK_SKEW_SECS) {
            return Err(InitDataError::InvalidAuthDate);
        }
        if let Some(max_age) = self.max_age {
            if now - auth_date > max_age {
                return Err(InitDataError::Expired);
            }
        }

        let user_json = params.remove("user").ok_or(InitDataError::MissingUser)?;
        let user: TelegramUser = serde_json::from_str(&user_json)
            .map_err(|e| InitDataError::InvalidUser(e.to_string()))?;

        Ok(InitData {
            user,
            auth_date,
            query_id: params.remove("query_id"),
            start_param: params.remove("start_param"),
            chat_type: params.remove("chat_type"),
            chat_instance: params.remove("chat_instance"),
        })
    }

    /// Build a signed init data string from raw pairs.
    ///
    /// Useful for local tooling and tests that need launch data without a
    /// Telegram client. Repeated keys, or a caller-supplied `hash`, are
    /// rejected since `validate` would refuse the result.
    pub fn sign(&self, pairs: &[(&str, &str)]) -> Result<String, InitDataError> {
        let mut params = BTreeMap::new();
        for (key, value) in pairs {
            if *key == "hash" || params.insert(key.to_string(), value.to_string()).is_some() {
                return Err(InitDataError::DuplicateKey(key.to_string()));
            }
        }

        let mut mac = self.mac();
        mac.update(data_check_string(&params).as_bytes());
        let hash = hex::encode(mac.finalize().into_bytes());

        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in pairs {
            serializer.append_pair(key, value);
        }
        serializer.append_pair("hash", &hash);
        Ok(serializer.finish())
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret_key).expect("HMAC accepts keys of any length")
    }
}

/// Derive the init data signing key from a bot token
pub fn secret_key(bot_token: &str) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(WEB_APP_DATA_KEY).expect("HMAC accepts keys of any length");
    mac.update(bot_token.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Sorted `key=value` lines joined by `\n`
pub fn data_check_string(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_pairs(raw: &str) -> Result<BTreeMap<String, String>, InitDataError> {
    let mut params = BTreeMap::new();
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        let key = key.into_owned();
        if params.contains_key(&key) {
            return Err(InitDataError::DuplicateKey(key));
        }
        params.insert(key, value.into_owned());
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT_TOKEN: &str = "1234567890:AAFakeBotTokenForTestsOnly_abcdefghij";
    const USER_JSON: &str = r#"{"id":279058397,"first_name":"Vladislav","last_name":"Kibenko","username":"vdkfrost","language_code":"ru","is_premium":true,"allows_write_to_pm":true}"#;

    // Signed independently of this module.
    const KNOWN_INIT_DATA: &str = "query_id=AAHdF6IQAAAAAN0XohDhrOrc&user=%7B%22id%22%3A279058397%2C%22first_name%22%3A%22Vladislav%22%2C%22last_name%22%3A%22Kibenko%22%2C%22username%22%3A%22vdkfrost%22%2C%22language_code%22%3A%22ru%22%2C%22is_premium%22%3Atrue%2C%22allows_write_to_pm%22%3Atrue%7D&auth_date=1700000000&hash=168caaa5a5782f990919e86c34488c8b7bb0966f7b7afd4583c2d1138694f822";

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn validator() -> InitDataValidator {
        InitDataValidator::new(BOT_TOKEN, 86_400)
    }

    #[test]
    fn test_secret_key_derivation() {
        assert_eq!(
            hex::encode(secret_key(BOT_TOKEN)),
            "9145a6d30d0a7ed05e6bda5e24f3b4ee725605475df7bd8c72e7f924346c7a2d"
        );
    }

    #[test]
    fn test_validates_known_init_data() {
        let data = validator()
            .validate_at(KNOWN_INIT_DATA, at(1_700_000_100))
            .unwrap();

        assert_eq!(data.user.id, 279058397);
        assert_eq!(data.user.username.as_deref(), Some("vdkfrost"));
        assert!(data.user.is_premium);
        assert_eq!(data.auth_date.timestamp(), 1_700_000_000);
        assert_eq!(data.query_id.as_deref(), Some("AAHdF6IQAAAAAN0XohDhrOrc"));
        assert_eq!(data.start_param, None);
    }

    #[test]
    fn test_signed_data_round_trips_regardless_of_order() {
        let v = validator();
        let signed = v.sign(&[
            ("user", USER_JSON),
            ("start_param", "ref_42"),
            ("auth_date", "1700000000"),
            ("chat_type", "private"),
        ])
        .unwrap();

        let data = v.validate_at(&signed, at(1_700_000_000)).unwrap();
        assert_eq!(data.start_param.as_deref(), Some("ref_42"));
        assert_eq!(data.chat_type.as_deref(), Some("private"));

        let mut parts: Vec<&str> = signed.split('&').collect();
        parts.reverse();
        assert!(v.validate_at(&parts.join("&"), at(1_700_000_000)).is_ok());
    }

    #[test]
    fn test_wrong_bot_token_is_rejected() {
        let other = InitDataValidator::new("999:other-token", 86_400);
        assert_eq!(
            other.validate_at(KNOWN_INIT_DATA, at(1_700_000_000)).unwrap_err(),
            InitDataError::SignatureMismatch
        );
    }

    #[test]
    fn test_tampered_value_is_rejected() {
        let tampered = KNOWN_INIT_DATA.replace("279058397", "279058398");
        assert_eq!(
            validator().validate_at(&tampered, at(1_700_000_000)).unwrap_err(),
            InitDataError::SignatureMismatch
        );
    }

    #[test]
    fn test_tampered_hash_is_rejected() {
        let tampered = KNOWN_INIT_DATA.replace("hash=168c", "hash=168d");
        assert_eq!(
            validator().validate_at(&tampered, at(1_700_000_000)).unwrap_err(),
            InitDataError::SignatureMismatch
        );
    }

    #[test]
    fn test_malformed_input() {
        let v = validator();
        let now = at(1_700_000_000);

        assert_eq!(v.validate_at("  ", now).unwrap_err(), InitDataError::Empty);
        assert_eq!(
            v.validate_at("auth_date=1700000000", now).unwrap_err(),
            InitDataError::MissingHash
        );
        assert_eq!(
            v.validate_at("auth_date=1&hash=zz", now).unwrap_err(),
            InitDataError::InvalidHash
        );
        assert_eq!(
            v.validate_at("auth_date=1&hash=abcd", now).unwrap_err(),
            InitDataError::InvalidHash
        );
        assert_eq!(
            v.validate_at("a=1&a=2&hash=00", now).unwrap_err(),
            InitDataError::DuplicateKey("a".to_string())
        );
    }

    #[test]
    fn test_expired_init_data() {
        let v = validator();
        let signed = v.sign(&[("auth_date", "1700000000"), ("user", USER_JSON)]).unwrap();

        assert!(v.validate_at(&signed, at(1_700_086_400)).is_ok());
        assert_eq!(
            v.validate_at(&signed, at(1_700_086_401)).unwrap_err(),
            InitDataError::Expired
        );

        let lenient = InitDataValidator::new(BOT_TOKEN, 0);
        assert!(lenient.validate_at(&signed, at(1_900_000_000)).is_ok());
    }

    #[test]
    fn test_auth_date_in_the_future() {
        let v = validator();
        let signed = v.sign(&[("auth_date", "1700000100"), ("user", USER_JSON)]).unwrap();

        assert!(v.validate_at(&signed, at(1_700_000_040)).is_ok());
        assert_eq!(
            v.validate_at(&signed, at(1_700_000_000)).unwrap_err(),
            InitDataError::InvalidAuthDate
        );
    }

    #[test]
    fn test_missing_fields_after_signature_check() {
        let v = validator();
        let now = at(1_700_000_000);

        let no_date = v.sign(&[("user", USER_JSON)]).unwrap();
        assert_eq!(
            v.validate_at(&no_date, now).unwrap_err(),
            InitDataError::MissingAuthDate
        );

        let bad_date = v.sign(&[("auth_date", "yesterday"), ("user", USER_JSON)]).unwrap();
        assert_eq!(
            v.validate_at(&bad_date, now).unwrap_err(),
            InitDataError::InvalidAuthDate
        );

        let no_user = v.sign(&[("auth_date", "1700000000")]).unwrap();
        assert_eq!(
            v.validate_at(&no_user, now).unwrap_err(),
            InitDataError::MissingUser
        );

        let bad_user = v
            .sign(&[("auth_date", "1700000000"), ("user", "{\"id\":\"x\"}")])
            .unwrap();
        assert!(matches!(
            v.validate_at(&bad_user, now).unwrap_err(),
            InitDataError::InvalidUser(_)
        ));
    }

    #[test]
    fn test_sign_rejects_repeated_keys() {
        let v = validator();

        assert_eq!(
            v.sign(&[("auth_date", "1"), ("user", USER_JSON), ("auth_date", "2")])
                .unwrap_err(),
            InitDataError::DuplicateKey("auth_date".to_string())
        );
        assert_eq!(
            v.sign(&[("auth_date", "1"), ("hash", "00")]).unwrap_err(),
            InitDataError::DuplicateKey("hash".to_string())
        );
    }

    #[test]
    fn test_data_check_string_is_sorted() {
        let params: BTreeMap<String, String> = [("user", "{}"), ("auth_date", "1"), ("query_id", "q")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        assert_eq!(data_check_string(&params), "auth_date=1\nquery_id=q\nuser={}");
    }
}
