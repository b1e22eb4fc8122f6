//! Проверка init data Telegram Mini App
//!
//! Telegram подписывает init data через HMAC-SHA256. Ключ выводится из токена
//! бота: `HMAC_SHA256(key = "WebAppData", data = bot_token)`. Обратный порядок
//! (ключ = токен, данные = "WebAppData") дает другую подпись и не проходит.
//! См. <https://core.telegram.org/bots/webapps#validating-data-received-via-the-mini-app>.

use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Допустимое расхождение часов клиента и сервера для `auth_date` из будущего
pub const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Причина отказа запросу Mini App. Пишется в лог, клиенту не отдается.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing hash parameter")]
    MissingHash,
    #[error("hash is not valid hex")]
    MalformedHash,
    #[error("invalid hash - data may be tampered")]
    InvalidSignature,
    #[error("missing auth_date parameter")]
    MissingAuthDate,
    #[error("init data is too old ({age_secs} seconds)")]
    Expired { age_secs: i64 },
    #[error("auth_date is {ahead_secs} seconds in the future")]
    IssuedInFuture { ahead_secs: i64 },
}

/// Объект `user` внутри init data
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebAppUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

/// Проверенные init data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebAppInitData {
    /// `None`, если поля нет или это не объект пользователя
    pub user: Option<WebAppUser>,
    pub auth_date: Option<i64>,
    pub query_id: Option<String>,
}

fn parse_pairs(init_data: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(init_data.as_bytes()).into_owned().collect()
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<HmacSha256, AuthError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| AuthError::InvalidSignature)?;
    mac.update(data);
    Ok(mac)
}

/// Строит data-check-string: все поля кроме `hash`, отсортированные по ключу,
/// в виде `key=value` через `\n`.
pub fn data_check_string(pairs: &[(String, String)]) -> String {
    let mut fields: Vec<&(String, String)> = pairs.iter().filter(|(key, _)| key != "hash").collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn signing_mac(pairs: &[(String, String)], bot_token: &str) -> Result<HmacSha256, AuthError> {
    // secret_key = HMAC_SHA256(key = "WebAppData", data = bot_token)
    let secret_key = hmac_sha256(b"WebAppData", bot_token.as_bytes())?.finalize().into_bytes();
    hmac_sha256(&secret_key, data_check_string(pairs).as_bytes())
}

/// Hex-подпись, которую Telegram приложил бы к `pairs`
pub fn data_check_hash(pairs: &[(String, String)], bot_token: &str) -> Result<String, AuthError> {
    Ok(hex::encode(signing_mac(pairs, bot_token)?.finalize().into_bytes()))
}

/// Проверяет подпись и возвращает подписанные поля (без `hash`)
fn check_signature(init_data: &str, bot_token: &str) -> Result<Vec<(String, String)>, AuthError> {
    let mut pairs = parse_pairs(init_data);

    let received_hash = pairs
        .iter()
        .find(|(key, _)| key == "hash")
        .map(|(_, value)| value.clone())
        .ok_or(AuthError::MissingHash)?;
    pairs.retain(|(key, _)| key != "hash");

    // hex::decode принимает оба регистра; verify_slice сравнивает за постоянное время
    let expected = hex::decode(&received_hash).map_err(|_| AuthError::MalformedHash)?;
    signing_mac(&pairs, bot_token)?
        .verify_slice(&expected)
        .map_err(|_| AuthError::InvalidSignature)?;

    Ok(pairs)
}

/// Валидирует init data и извлекает пользователя и время подписи.
///
/// # Пример
/// ```rust
/// use jobs_bot::telegram::webapp_auth::validate_telegram_webapp_data;
///
/// assert!(validate_telegram_webapp_data("user=%7B%22id%22%3A1%7D&hash=00", "1:token").is_err());
/// ```
pub fn validate_telegram_webapp_data(init_data: &str, bot_token: &str) -> Result<WebAppInitData, AuthError> {
    let pairs = check_signature(init_data, bot_token)?;
    let field = |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    };

    let user = field("user").and_then(|json| match serde_json::from_str::<WebAppUser>(json) {
        Ok(user) => Some(user),
        Err(e) => {
            log::debug!("Signed init data carries an unusable user object: {}", e);
            None
        }
    });

    Ok(WebAppInitData {
        user,
        auth_date: field("auth_date").and_then(|v| v.parse().ok()),
        query_id: field("query_id").map(str::to_string),
    })
}

/// `true` только для init data, подписанных `bot_token`.
///
/// Никогда не паникует: некорректный ввод просто не подлинный.
pub fn verify(init_data: &str, bot_token: &str) -> bool {
    check_signature(init_data, bot_token).is_ok()
}

/// Проверка init data, привязанная к токену бота и сроку свежести
pub struct WebAppAuthenticator {
    bot_token: SecretString,
    max_age: Option<Duration>,
}

impl WebAppAuthenticator {
    pub fn new(bot_token: SecretString, max_age: Option<Duration>) -> Self {
        Self { bot_token, max_age }
    }

    /// Проверяет подпись, а при заданном max age еще и `auth_date`:
    /// слишком старые и датированные будущим (дальше `MAX_CLOCK_SKEW_SECS`) отклоняются.
    pub fn authenticate(&self, init_data: &str) -> Result<WebAppInitData, AuthError> {
        let data = validate_telegram_webapp_data(init_data, self.bot_token.expose_secret())?;

        if let Some(max_age) = self.max_age {
            let auth_date = data.auth_date.ok_or(AuthError::MissingAuthDate)?;
            let age_secs = Utc::now().timestamp().saturating_sub(auth_date);
            if age_secs < -MAX_CLOCK_SKEW_SECS {
                return Err(AuthError::IssuedInFuture {
                    ahead_secs: age_secs.saturating_neg(),
                });
            }
            if age_secs > i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX) {
                return Err(AuthError::Expired { age_secs });
            }
        }

        Ok(data)
    }

    pub fn verify(&self, init_data: &str) -> bool {
        self.authenticate(init_data).is_ok()
    }
}
