use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Console configuration from `opsconsole.yaml`
///
/// Loaded once at startup and read-only afterwards. Every field has a built-in
/// default, so a partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_file")]
    pub default_file: Utf8PathBuf,

    #[serde(default = "default_base_dir")]
    pub base_dir: Utf8PathBuf,

    /// Directory holding lock markers and `audit.log`
    #[serde(default = "default_out_dir")]
    pub out_dir: Utf8PathBuf,

    #[serde(default = "default_ext")]
    pub default_ext: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            default_file: default_file(),
            base_dir: default_base_dir(),
            out_dir: default_out_dir(),
            default_ext: default_ext(),
        }
    }
}

fn default_file() -> Utf8PathBuf {
    Utf8PathBuf::from("data/input.txt")
}

fn default_base_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("data")
}

fn default_out_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("out")
}

fn default_ext() -> String {
    ".txt".to_string()
}
