mod loader;
mod validation;

pub use loader::{
    load_config, load_config_from, ConfigError, API_KEY_VAR, CONFIG_PATH_VAR, PORT_VAR,
};
pub use validation::validate;
