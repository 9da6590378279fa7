//! Server configuration.
//!
//! Values resolve in three layers: built-in defaults, then `STUDIO_*`
//! environment variables, then command-line flags. Later layers win.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const USAGE: &str = "studio server\n\nUSAGE:\n  studio [--bind ADDR] [--http-port N] [--users-file PATH] [--session-ttl SECS] [--sweep-interval SECS] [--login-path PATH] [--insecure-cookies]\n\nOPTIONS:\n  --bind ADDR            Bind address (env: STUDIO_BIND, default 0.0.0.0)\n  --http-port N          HTTP port (env: STUDIO_HTTP_PORT, default 7878)\n  --users-file PATH      Users file (env: STUDIO_USERS_FILE, default data/users.json)\n  --session-ttl SECS     Session lifetime (env: STUDIO_SESSION_TTL_SECS, default 3600)\n  --sweep-interval SECS  Expired-session sweep interval, 0 disables (env: STUDIO_SESSION_SWEEP_SECS, default 60)\n  --login-path PATH      Login entry point (env: STUDIO_LOGIN_PATH, default /login)\n  --insecure-cookies     Omit the Secure cookie attribute (env: STUDIO_SECURE_COOKIES=false)\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid port for {name}: '{value}'")]
    InvalidPort { name: String, value: String },
    #[error("invalid number of seconds for {name}: '{value}'")]
    InvalidSeconds { name: String, value: String },
    #[error("invalid boolean for {name}: '{value}'")]
    InvalidBool { name: String, value: String },
    #[error("missing value after {0}")]
    MissingValue(String),
    #[error("login path must be a plain absolute path outside /control and the public routes: '{0}'")]
    InvalidLoginPath(String),
}

/// Paths the public router mounts itself; the login page may not take them.
const RESERVED_PATHS: &[&str] = &["/", "/about", "/blog", "/case-studies", "/healthz", "/logout", "/control"];

/// Prefixes owned by parameterised or nested routes.
const RESERVED_PREFIXES: &[&str] = &["/blog/", "/case-studies/", "/control"];

fn validate_login_path(path: &str) -> Result<(), ConfigError> {
    let reserved = RESERVED_PATHS.contains(&path) || RESERVED_PREFIXES.iter().any(|p| path.starts_with(p));
    let malformed = !path.starts_with('/')
        || path.starts_with("//")
        || path.chars().any(|c| matches!(c, '{' | '}' | '*' | '?' | '#') || c.is_whitespace() || c.is_control());
    if reserved || malformed {
        return Err(ConfigError::InvalidLoginPath(path.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub http_port: u16,
    pub users_file: PathBuf,
    pub session_ttl: Duration,
    /// Zero disables the background sweeper.
    pub sweep_interval: Duration,
    pub login_path: String,
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            http_port: 7878,
            users_file: PathBuf::from("data/users.json"),
            session_ttl: Duration::from_secs(60 * 60),
            sweep_interval: Duration::from_secs(60),
            login_path: "/login".to_string(),
            secure_cookies: true,
        }
    }
}

fn parse_port(name: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort { name: name.to_string(), value: value.to_string() })
}

fn parse_secs(name: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidSeconds { name: name.to_string(), value: value.to_string() })
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { name: name.to_string(), value: value.to_string() }),
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>, ConfigError> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag {
            return match args.get(i + 1) {
                Some(v) if !v.starts_with("--") => Ok(Some(v.as_str())),
                _ => Err(ConfigError::MissingValue(flag.to_string())),
            };
        }
        i += 1;
    }
    Ok(None)
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

impl ServerConfig {
    /// Resolve from the process environment and the given arguments.
    pub fn from_env_and_args(args: &[String]) -> Result<Self, ConfigError> {
        Self::resolve(|k| std::env::var(k).ok(), args)
    }

    /// Resolve using an arbitrary environment lookup.
    pub fn resolve<E>(env: E, args: &[String]) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let mut cfg = ServerConfig::default();

        // Environment
        if let Some(v) = env("STUDIO_BIND") { cfg.bind_addr = v; }
        if let Some(v) = env("STUDIO_HTTP_PORT") { cfg.http_port = parse_port("STUDIO_HTTP_PORT", &v)?; }
        if let Some(v) = env("STUDIO_USERS_FILE") { cfg.users_file = PathBuf::from(v); }
        if let Some(v) = env("STUDIO_SESSION_TTL_SECS") { cfg.session_ttl = parse_secs("STUDIO_SESSION_TTL_SECS", &v)?; }
        if let Some(v) = env("STUDIO_SESSION_SWEEP_SECS") { cfg.sweep_interval = parse_secs("STUDIO_SESSION_SWEEP_SECS", &v)?; }
        if let Some(v) = env("STUDIO_LOGIN_PATH") { cfg.login_path = v; }
        if let Some(v) = env("STUDIO_SECURE_COOKIES") { cfg.secure_cookies = parse_bool("STUDIO_SECURE_COOKIES", &v)?; }

        // CLI arguments override environment
        if let Some(v) = arg_value(args, "--bind")? { cfg.bind_addr = v.to_string(); }
        if let Some(v) = arg_value(args, "--http-port")? { cfg.http_port = parse_port("--http-port", v)?; }
        if let Some(v) = arg_value(args, "--users-file")? { cfg.users_file = PathBuf::from(v); }
        if let Some(v) = arg_value(args, "--session-ttl")? { cfg.session_ttl = parse_secs("--session-ttl", v)?; }
        if let Some(v) = arg_value(args, "--sweep-interval")? { cfg.sweep_interval = parse_secs("--sweep-interval", v)?; }
        if let Some(v) = arg_value(args, "--login-path")? { cfg.login_path = v.to_string(); }
        if has_flag(args, "--insecure-cookies") { cfg.secure_cookies = false; }

        validate_login_path(&cfg.login_path)?;
        Ok(cfg)
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.http_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn args(v: &[&str]) -> Vec<String> { v.iter().map(|s| s.to_string()).collect() }

    #[test]
    fn defaults_without_env_or_args() {
        let cfg = ServerConfig::resolve(|_| None, &[]).unwrap();
        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.socket_addr(), "0.0.0.0:7878");
    }

    #[test]
    fn args_override_env() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("STUDIO_HTTP_PORT", "9000"),
            ("STUDIO_SESSION_TTL_SECS", "120"),
            ("STUDIO_SECURE_COOKIES", "off"),
        ]);
        let cfg = ServerConfig::resolve(|k| env.get(k).map(|s| s.to_string()), &args(&["studio", "--http-port", "9100"])).unwrap();
        assert_eq!(cfg.http_port, 9100);
        assert_eq!(cfg.session_ttl, Duration::from_secs(120));
        assert!(!cfg.secure_cookies);
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = ServerConfig::resolve(|_| None, &args(&["--http-port", "nope"])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPort { name: "--http-port".into(), value: "nope".into() });

        let err = ServerConfig::resolve(|_| None, &args(&["--users-file"])).unwrap_err();
        assert_eq!(err, ConfigError::MissingValue("--users-file".into()));

        let err = ServerConfig::resolve(|_| None, &args(&["--login-path", "login"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLoginPath(_)));

        let err = ServerConfig::resolve(|_| None, &args(&["--login-path", "/control/login"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLoginPath(_)));
    }

    #[test]
    fn login_path_cannot_shadow_public_routes() {
        for path in ["/", "/about", "/logout", "/healthz", "/blog", "/blog/login", "/case-studies/x", "/control"] {
            let err = ServerConfig::resolve(|_| None, &args(&["--login-path", path])).unwrap_err();
            assert_eq!(err, ConfigError::InvalidLoginPath(path.to_string()), "{}", path);
        }
    }

    #[test]
    fn login_path_rejects_route_syntax() {
        for path in ["/{user}", "/sign-in/{*rest}", "/a*b", "/sign in", "/login?x=1", "//login"] {
            let err = ServerConfig::resolve(|_| None, &args(&["--login-path", path])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidLoginPath(_)), "{}", path);
        }
        let env = |k: &str| (k == "STUDIO_LOGIN_PATH").then(|| "/about".to_string());
        assert!(ServerConfig::resolve(env, &[]).is_err());

        let cfg = ServerConfig::resolve(|_| None, &args(&["--login-path", "/sign-in"])).unwrap();
        assert_eq!(cfg.login_path, "/sign-in");
    }
}
