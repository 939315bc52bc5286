//! Environment source: DOCSYNC_DATA_DIR, DOCSYNC_DOCS_DIR, DOCSYNC_LOGGING__LEVEL, ...

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("DOCSYNC")
            .prefix_separator("_")
            .separator("__"),
    )
}
