#[cfg(feature = "cli")]
use clap::Parser;
use url::Url;

/// # Smoke Tester Configuration
///
/// Command-line arguments and environment variables (including a `.env` file)
/// select which chat-completion server is probed and how.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "ollama-smoke"))]
#[cfg_attr(feature = "cli", command(about = "Smoke-test an OpenAI-compatible chat-completion endpoint such as a local Ollama server"))]
#[cfg_attr(feature = "cli", command(version))]
pub struct Config {
    // =============================================================================
    // TARGET SERVER
    // =============================================================================

    /// Base URL of the chat-completion server (the endpoint path is appended)
    #[cfg_attr(feature = "cli", arg(long, env = "SMOKE_BASE_URL", default_value = "http://localhost:11434"))]
    pub base_url: String,

    /// Model identifier sent with every request
    #[cfg_attr(feature = "cli", arg(long, env = "SMOKE_MODEL", default_value = "llama2:7b-chat-q4_0"))]
    pub model: String,

    /// Bearer token for servers that require one (Ollama does not)
    #[cfg_attr(feature = "cli", arg(long, env = "SMOKE_API_KEY"))]
    pub api_key: Option<String>,

    // =============================================================================
    // HTTP CLIENT
    // =============================================================================

    /// Whole-request timeout in seconds
    #[cfg_attr(feature = "cli", arg(long, env = "SMOKE_TIMEOUT", default_value = "120"))]
    pub timeout: u64,

    /// Connection timeout in seconds
    #[cfg_attr(feature = "cli", arg(long, env = "SMOKE_CONNECT_TIMEOUT", default_value = "10"))]
    pub connect_timeout: u64,

    // =============================================================================
    // RUN CONTROL
    // =============================================================================

    /// Log filter: a level (warn, debug, ...) or directives like `ollama_smoke=debug`
    #[cfg_attr(feature = "cli", arg(long, env = "RUST_LOG", default_value = "warn"))]
    pub log_level: String,

    /// Exit non-zero when any check fails, not only on network or decode errors
    #[cfg_attr(feature = "cli", arg(long, env = "SMOKE_STRICT", default_value = "false"))]
    pub strict: bool,

    /// Run only the named built-in scenario (repeatable; default runs all)
    #[cfg_attr(feature = "cli", arg(long = "scenario"))]
    pub scenarios: Vec<String>,
}

impl Config {
    /// Parse configuration from command line arguments and environment variables.
    ///
    /// Loads `.env` first, then parses flags, sets up logging and validates.
    /// Exits the process with status 1 when validation fails.
    #[cfg(feature = "cli")]
    pub fn parse_args() -> Self {
        // Load .env file if it exists (ignore errors if file doesn't exist)
        let _ = dotenv::dotenv();

        let config = Self::parse();

        config.setup_logging();

        if let Err(err) = config.validate() {
            eprintln!("Configuration validation failed: {}", err);
            std::process::exit(1);
        }

        config
    }

    /// Create a test configuration for a local Ollama with short timeouts.
    pub fn for_test() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama2:7b-chat-q4_0".to_string(),
            api_key: None,
            timeout: 5,
            connect_timeout: 2,
            log_level: "warn".to_string(),
            strict: false,
            scenarios: Vec::new(),
        }
    }

    /// Initialise the tracing subscriber. Logs go to stderr so that stdout
    /// carries only the report.
    #[cfg(feature = "cli")]
    fn setup_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(&self.log_level)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .try_init();
    }

    /// Validate configuration values and provide helpful error messages.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("Base URL cannot be empty. Please specify the server URL (e.g., 'http://localhost:11434').".to_string());
        }

        match Url::parse(&self.base_url) {
            Ok(url) => {
                if !["http", "https"].contains(&url.scheme()) {
                    return Err(format!(
                        "Invalid URL scheme '{}'. Only 'http' and 'https' are supported.",
                        url.scheme()
                    ));
                }
                if url.host().is_none() {
                    return Err("Base URL must include a host (e.g., 'http://localhost:11434').".to_string());
                }
            }
            Err(err) => {
                return Err(format!(
                    "Invalid base URL '{}': {}. Please provide a valid URL (e.g., 'http://localhost:11434').",
                    self.base_url, err
                ));
            }
        }

        if self.model.trim().is_empty() {
            return Err("Model cannot be empty. Please specify a model identifier.".to_string());
        }

        // Ollama tags look like `llama2:7b-chat-q4_0`, hosted ids like `org/model`
        if !self
            .model
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.' | '/'))
        {
            return Err(format!(
                "Model '{}' contains invalid characters. \
                Only alphanumerics and '-', '_', ':', '.', '/' are allowed.",
                self.model
            ));
        }

        if self.timeout == 0 {
            return Err("Timeout must be greater than 0 seconds.".to_string());
        }
        if self.connect_timeout == 0 {
            return Err("Connect timeout must be greater than 0 seconds.".to_string());
        }
        if self.connect_timeout > self.timeout {
            tracing::warn!(
                connect_timeout = self.connect_timeout,
                timeout = self.timeout,
                "connect timeout exceeds request timeout; the request timeout wins"
            );
        }

        if let Some(key) = &self.api_key {
            if key.trim().is_empty() {
                return Err("API key is set but empty. Unset SMOKE_API_KEY or provide a value.".to_string());
            }
        }

        self.validate_log_filter()?;

        Ok(())
    }

    /// Accept any `RUST_LOG`-style directive list, e.g. `ollama_smoke=debug,reqwest=warn`.
    #[cfg(feature = "cli")]
    fn validate_log_filter(&self) -> Result<(), String> {
        tracing_subscriber::EnvFilter::try_new(&self.log_level)
            .map(|_| ())
            .map_err(|err| format!("Invalid log filter '{}': {}", self.log_level, err))
    }

    /// Without the subscriber only bare level names can be checked.
    #[cfg(not(feature = "cli"))]
    fn validate_log_filter(&self) -> Result<(), String> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log filter '{}'. Valid options are: {}",
                self.log_level,
                valid_log_levels.join(", ")
            ));
        }
        Ok(())
    }

    /// Base URL with credentials and path stripped, safe for logs.
    pub fn display_base_url(&self) -> String {
        match Url::parse(&self.base_url) {
            Ok(url) => match url.port() {
                Some(port) => format!("{}://{}:{}", url.scheme(), url.host_str().unwrap_or("unknown"), port),
                None => format!("{}://{}", url.scheme(), url.host_str().unwrap_or("unknown")),
            },
            Err(_) => "invalid-url".to_string(),
        }
    }
}
