use std::path::PathBuf;

const PULSE_CONFIG: &str = "PULSE_CONFIG";

pub fn get_config_path() -> Option<PathBuf> {
    let path_from_env = std::env::var(PULSE_CONFIG);
    path_from_env
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
}

const PULSE_INTERVAL: &str = "PULSE_INTERVAL";

pub fn get_interval() -> Option<String> {
    std::env::var(PULSE_INTERVAL)
        .ok()
        .filter(|raw| !raw.trim().is_empty())
}

const PULSE_TIMEOUT: &str = "PULSE_TIMEOUT";

pub fn get_timeout() -> Option<String> {
    std::env::var(PULSE_TIMEOUT)
        .ok()
        .filter(|raw| !raw.trim().is_empty())
}

const CONFIG_SYSTEM_DIR: &str = "/etc/pulse";

const CONFIG_FILE_NAMES: &[&str] = &["pulse.toml", "pulse.json"];

/// Directories searched for a config file, in order of preference
pub fn config_search_dirs() -> Vec<PathBuf> {
    let mut search = vec![];
    if let Some(home) = dirs::home_dir() {
        search.push(home);
    }
    search.push(PathBuf::from("."));
    search.push(PathBuf::from(CONFIG_SYSTEM_DIR));
    search
}

/// Find the first existing config file below any of `dirs`
pub fn find_config_file(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}
