// src/config.rs
use crate::domain::errors::{AppError, AppResult};
use dotenv::dotenv;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;

/// Rate service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Binance P2P order-book source configuration
    pub p2p: P2pConfig,

    /// BCV official-rate scrape configuration
    pub bcv: BcvConfig,

    /// Rate history ledger configuration
    pub ledger: LedgerConfig,

    /// Trend classification thresholds
    pub trend: TrendConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080")
    pub bind_addr: String,
}

/// Binance P2P source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct P2pConfig {
    /// Order-book search endpoint
    pub search_url: String,

    /// Asset to quote (e.g., "USDT")
    pub asset: String,

    /// Fiat currency (e.g., "VES")
    pub fiat: String,

    /// Side of the book to sample ("BUY" or "SELL")
    pub trade_type: String,

    /// Page size: how many top-ranked ads to sample
    pub rows: u32,

    /// Payment-method whitelist sent with the search
    pub pay_types: Vec<String>,

    /// Upstream request timeout in seconds
    pub timeout_secs: u64,

    /// Cache freshness window in seconds
    pub freshness_secs: u64,
}

/// BCV official-rate scrape configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BcvConfig {
    /// Page to scrape
    pub page_url: String,

    /// CSS selector for the USD value element
    pub usd_selector: String,

    /// CSS selector for the EUR value element
    pub eur_selector: String,

    /// User-Agent header sent with the scrape
    pub user_agent: String,

    /// Upstream request timeout in seconds, per page
    pub usd_timeout_secs: u64,
    pub eur_timeout_secs: u64,

    /// Legacy trust exception: the BCV host serves an invalid certificate
    /// chain, so the USD client alone skips verification. Scoped to that
    /// client, never a process-wide default.
    pub usd_accept_invalid_certs: bool,

    /// Cache freshness window in seconds
    pub freshness_secs: u64,
}

/// Rate history ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Directory backing the key-value store
    pub storage_dir: String,

    /// Slot name holding the serialized history
    pub storage_key: String,

    /// Bounded window of most-recent days retained
    pub max_entries: usize,
}

/// Trend classification thresholds. Tuned by trial in production; kept as
/// configuration with the tuned values as defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Same-day move, in percent, that defines the trend on its own
    pub significant_change_percent: Decimal,

    /// Day-over-day step, in percent, counted as an up/down day
    pub daily_step_percent: Decimal,

    /// Same-day counter-move, in percent, that cancels a multi-day trend
    pub contradiction_percent: Decimal,

    /// Absolute change, in percent, above which advice switches to the
    /// urgent phrasing
    pub urgent_advice_percent: Decimal,

    /// How many recent ledger entries the multi-day rule examines
    pub recent_window: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let server = ServerConfig {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        };

        let pay_types = env::var("P2P_PAY_TYPES")
            .unwrap_or_else(|_| default_pay_types().join(","))
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let p2p = P2pConfig {
            search_url: env::var("P2P_SEARCH_URL").unwrap_or_else(|_| {
                "https://p2p.binance.com/bapi/c2c/v2/friendly/c2c/adv/search".to_string()
            }),
            asset: env::var("P2P_ASSET").unwrap_or_else(|_| "USDT".to_string()),
            fiat: env::var("P2P_FIAT").unwrap_or_else(|_| "VES".to_string()),
            trade_type: env::var("P2P_TRADE_TYPE").unwrap_or_else(|_| "BUY".to_string()),
            rows: env::var("P2P_ROWS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            pay_types,
            timeout_secs: env::var("P2P_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            freshness_secs: env::var("P2P_FRESHNESS_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        };

        let bcv = BcvConfig {
            page_url: env::var("BCV_PAGE_URL")
                .unwrap_or_else(|_| "https://www.bcv.org.ve/".to_string()),
            usd_selector: env::var("BCV_USD_SELECTOR")
                .unwrap_or_else(|_| "#dolar strong".to_string()),
            eur_selector: env::var("BCV_EUR_SELECTOR")
                .unwrap_or_else(|_| "#euro strong".to_string()),
            user_agent: env::var("BCV_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
            usd_timeout_secs: env::var("BCV_USD_TIMEOUT_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap_or(15),
            eur_timeout_secs: env::var("BCV_EUR_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            usd_accept_invalid_certs: env::var("BCV_USD_ACCEPT_INVALID_CERTS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            freshness_secs: env::var("BCV_FRESHNESS_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .unwrap_or(600),
        };

        let ledger = LedgerConfig {
            storage_dir: env::var("LEDGER_STORAGE_DIR").unwrap_or_else(|_| "data".to_string()),
            storage_key: env::var("LEDGER_STORAGE_KEY")
                .unwrap_or_else(|_| "criptoguia_rate_history".to_string()),
            max_entries: env::var("LEDGER_MAX_ENTRIES")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        };

        let trend = TrendConfig {
            significant_change_percent: env::var("TREND_SIGNIFICANT_CHANGE_PERCENT")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .unwrap_or(Decimal::new(2, 0)),
            daily_step_percent: env::var("TREND_DAILY_STEP_PERCENT")
                .unwrap_or_else(|_| "0.5".to_string())
                .parse()
                .unwrap_or(Decimal::new(5, 1)),
            contradiction_percent: env::var("TREND_CONTRADICTION_PERCENT")
                .unwrap_or_else(|_| "0.05".to_string())
                .parse()
                .unwrap_or(Decimal::new(5, 2)),
            urgent_advice_percent: env::var("TREND_URGENT_ADVICE_PERCENT")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(Decimal::new(3, 0)),
            recent_window: env::var("TREND_RECENT_WINDOW")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            to_file: env::var("LOG_TO_FILE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        Ok(Config {
            server,
            p2p,
            bcv,
            ledger,
            trend,
            logging,
        })
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        // Set log level
        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);

        // Configure output
        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path)
                    .map_err(|e| AppError::Config(format!("Failed to create log file: {}", e)))?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        // Initialize the logger
        builder.init();

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0:8080".to_string(),
            },
            p2p: P2pConfig {
                search_url: "https://p2p.binance.com/bapi/c2c/v2/friendly/c2c/adv/search"
                    .to_string(),
                asset: "USDT".to_string(),
                fiat: "VES".to_string(),
                trade_type: "BUY".to_string(),
                rows: 10,
                pay_types: default_pay_types(),
                timeout_secs: 10,
                freshness_secs: 30,
            },
            bcv: BcvConfig {
                page_url: "https://www.bcv.org.ve/".to_string(),
                usd_selector: "#dolar strong".to_string(),
                eur_selector: "#euro strong".to_string(),
                user_agent: default_user_agent(),
                usd_timeout_secs: 15,
                eur_timeout_secs: 10,
                usd_accept_invalid_certs: true,
                freshness_secs: 600,
            },
            ledger: LedgerConfig {
                storage_dir: "data".to_string(),
                storage_key: "criptoguia_rate_history".to_string(),
                max_entries: 30,
            },
            trend: TrendConfig {
                significant_change_percent: Decimal::new(2, 0),
                daily_step_percent: Decimal::new(5, 1),
                contradiction_percent: Decimal::new(5, 2),
                urgent_advice_percent: Decimal::new(3, 0),
                recent_window: 5,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}

/// Popular Venezuelan payment methods the P2P search is filtered by
fn default_pay_types() -> Vec<String> {
    [
        "Banesco",
        "Mercantil",
        "Provincial",
        "BankTransfer",
        "Pago Movil",
        "Bancamiga",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Browser-like User-Agent; the BCV site rejects obviously scripted clients
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}
