use crate::GnoPlugin;
use crate::error::GnoError;
use gnodriver_api::models::Language;
use gnodriver_plugin::LanguageCaps;
use std::sync::Arc;

pub fn gno_caps() -> Result<LanguageCaps, GnoError> {
    let plugin = Arc::new(GnoPlugin::new()?);
    Ok(LanguageCaps {
        language: Language::GNO,
        matcher: plugin.clone(),
        header: plugin.clone(),
        manifest: plugin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnodriver_plugin::SourceKind;
    use std::path::Path;

    #[test]
    fn test_caps_bundle() {
        let caps = gno_caps().unwrap();
        assert_eq!(caps.language, Language::GNO);
        assert_eq!(caps.manifest.manifest_file_name(), "gno.mod");
        assert_eq!(
            caps.matcher.classify(Path::new("/work/avl/node_test.gno")),
            SourceKind::Test
        );
        assert!(caps.matcher.supports_path(Path::new("/work/avl/node.gno")));
        assert!(!caps.matcher.supports_path(Path::new("/work/avl/gno.mod")));

        let header = caps
            .header
            .scan_header("package avl\nimport \"std\"\n", Path::new("node.gno"))
            .unwrap();
        assert_eq!(header.package_name, "avl");

        let info = caps
            .manifest
            .read_manifest(Path::new("gno.mod"), "module gno.land/p/demo/avl\n")
            .unwrap();
        assert_eq!(info.module_path, "gno.land/p/demo/avl");
        assert!(
            caps.manifest
                .read_manifest(Path::new("gno.mod"), "require x v1\n")
                .is_err()
        );
    }
}
