/// Name of the environment variable containing the path to the reflection configuration file.
/// If not set, defaults to
///  (1) on Linux and macOS: `$XDG_CONFIG_HOME/hyreflect/config.toml` or `$HOME/.config/hyreflect/config.toml`
///  (2) on Windows: `%APPDATA%\hyreflect\config.toml`
pub const ENV_CONFIG_PATH: &str = "HYREFLECT_CONFIG_PATH";

/// Directory holding the configuration file under the platform configuration root.
pub const CONFIG_DIR_NAME: &str = "hyreflect";

/// File name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";
