//! Module entry points: what a host calls when it loads or unloads the
//! plugin.

use std::sync::Arc;

use nineslice_types::error::Result;

use crate::config::FilterConfig;
use crate::gpu::GraphicsContext;
use crate::host::SceneScaleQuery;
use crate::kind::{FilterRegistry, NineSliceKind};
use crate::locale::Locale;
use crate::{PLUGIN_NAME, PLUGIN_VERSION};

/// Register the nine-slice kind with `registry`.
pub fn load(
    registry: &mut FilterRegistry,
    config: FilterConfig,
    graphics: Arc<GraphicsContext>,
    scene_query: Option<Arc<dyn SceneScaleQuery>>,
) -> Result<()> {
    let mut kind = NineSliceKind::new(config, graphics);
    if let Some(query) = scene_query {
        kind = kind.with_scene_query(query);
    }
    registry.register(Box::new(kind))?;
    log::info!("[{PLUGIN_NAME}] plugin loaded successfully (version {PLUGIN_VERSION})");
    Ok(())
}

pub fn unload() {
    log::info!("[{PLUGIN_NAME}] plugin unloaded");
}

/// Localized module description.
pub fn description() -> String {
    Locale::en_us().text("NineSlice.Description").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::NINE_SLICE_ID;
    use crate::test_utils::MockDevice;

    fn graphics() -> Arc<GraphicsContext> {
        Arc::new(GraphicsContext::new(Box::new(MockDevice::new())))
    }

    #[test]
    fn load_registers_kind_once() {
        let mut registry = FilterRegistry::new();
        load(&mut registry, FilterConfig::default(), graphics(), None).unwrap();
        assert!(registry.contains(NINE_SLICE_ID));
        assert!(load(&mut registry, FilterConfig::default(), graphics(), None).is_err());
        assert_eq!(registry.len(), 1);
        unload();
    }

    #[test]
    fn description_is_localized() {
        assert!(description().starts_with("Scales a source"));
    }
}
