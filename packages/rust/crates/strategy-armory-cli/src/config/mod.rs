//! Config namespace: runtime settings loading.

mod settings;

pub use settings::{
    CacheSettings, RuntimeSettings, StrategySettings, load_runtime_settings,
    load_runtime_settings_from_paths, project_root, resolve_project_path, runtime_settings_paths,
    set_config_home_override,
};
