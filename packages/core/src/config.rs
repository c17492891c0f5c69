//! Централизованная конфигурация для MSL client core
//!
//! Timeouts and key exchange identifiers live here instead of being
//! hard-coded across the client.

use std::sync::OnceLock;

/// Глобальная конфигурация (синглтон)
static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

/// Основная структура конфигурации
#[derive(Debug, Clone)]
pub struct Config {
    // ============================================
    // СЕТЕВЫЕ ПАРАМЕТРЫ
    // ============================================

    /// Timeout budget handed to the negotiation service for every request
    /// (в миллисекундах)
    pub request_timeout_ms: u64,

    // ============================================
    // KEY EXCHANGE ПАРАМЕТРЫ
    // ============================================

    /// Named parameter group for Diffie-Hellman key requests
    pub dh_parameters_id: String,

    /// Key pair identifier announced in asymmetric wrapped key requests
    pub wrap_key_pair_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout_ms: 120_000, // 2 minutes
            dh_parameters_id: "x25519".to_string(),
            wrap_key_pair_id: "default_awe_key_pair".to_string(),
        }
    }
}

impl Config {
    /// Создать конфигурацию из переменных окружения
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("MSL_REQUEST_TIMEOUT_MS") {
            if let Ok(parsed) = val.parse() {
                config.request_timeout_ms = parsed;
            }
        }

        if let Ok(val) = std::env::var("MSL_DH_PARAMETERS_ID") {
            if !val.trim().is_empty() {
                config.dh_parameters_id = val;
            }
        }

        if let Ok(val) = std::env::var("MSL_WRAP_KEY_PAIR_ID") {
            if !val.trim().is_empty() {
                config.wrap_key_pair_id = val;
            }
        }

        config
    }

    /// Получить глобальный экземпляр конфигурации
    ///
    /// Автоматически инициализирует конфигурацию со значениями по умолчанию при первом вызове
    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(Config::default)
    }

    /// Инициализировать глобальную конфигурацию из переменных окружения
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_from_env() -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(Self::from_env())
            .map_err(|_| "Config already initialized")
    }

    /// Инициализировать глобальную конфигурацию с кастомным экземпляром
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_with(config: Config) -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(config)
            .map_err(|_| "Config already initialized")
    }

    /// Проверить, инициализирована ли глобальная конфигурация
    pub fn is_initialized() -> bool {
        GLOBAL_CONFIG.get().is_some()
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms)
    }
}
