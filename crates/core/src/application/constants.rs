// Operational constants (no magic values)
use std::time::Duration;

/// Wait between SIGTERM and SIGKILL in the stop sequence (200ms)
pub const STOP_GRACE_PERIOD: Duration = Duration::from_millis(200);

/// Default status server port (`PORT`)
pub const DEFAULT_PORT: u16 = 8000;

/// Default status server bind address (`BIND`)
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Inventory file used when neither `--config` nor `TF_CONFIG_PATH` is given
pub const DEFAULT_CONFIG_PATH: &str = "tf.yml";

/// Environment variable selecting the inventory file
pub const CONFIG_PATH_ENV: &str = "TF_CONFIG_PATH";

/// Translation catalog checked by `check-i18n`
pub const DEFAULT_TRANSLATIONS_PATH: &str = "src/static/mini_app/translations.json";

/// Where `local-hosts` leaves a copy of the managed block
pub const DEFAULT_HOSTS_ARTIFACT: &str = "artifacts/hosts.block";

/// Hub hosts file
pub const SYSTEM_HOSTS_FILE: &str = "/etc/hosts";

/// Floor for reachability probes after fabric setup
pub const MIN_REACHABILITY_TIMEOUT: Duration = Duration::from_secs(1);
