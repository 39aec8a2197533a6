//! Request and response of the external package driver protocol.

use super::package::{PackageDescriptor, PackageId};
use super::util::nullable;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Bit set describing which parts of a package the client wants filled in.
///
/// The driver always fills every field it knows about; the mode is carried
/// for logging and passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct LoadMode(pub u64);

impl LoadMode {
    pub const NEED_NAME: LoadMode = LoadMode(1 << 0);
    pub const NEED_FILES: LoadMode = LoadMode(1 << 1);
    pub const NEED_COMPILED_GO_FILES: LoadMode = LoadMode(1 << 2);
    pub const NEED_IMPORTS: LoadMode = LoadMode(1 << 3);
    pub const NEED_DEPS: LoadMode = LoadMode(1 << 4);
    pub const NEED_EXPORT_FILE: LoadMode = LoadMode(1 << 5);
    pub const NEED_TYPES: LoadMode = LoadMode(1 << 6);
    pub const NEED_SYNTAX: LoadMode = LoadMode(1 << 7);
    pub const NEED_TYPES_INFO: LoadMode = LoadMode(1 << 8);
    pub const NEED_TYPES_SIZES: LoadMode = LoadMode(1 << 9);
    pub const NEED_MODULE: LoadMode = LoadMode(1 << 13);
    pub const NEED_EMBED_FILES: LoadMode = LoadMode(1 << 14);
    pub const NEED_EMBED_PATTERNS: LoadMode = LoadMode(1 << 15);

    const NAMES: [(LoadMode, &'static str); 13] = [
        (Self::NEED_NAME, "NeedName"),
        (Self::NEED_FILES, "NeedFiles"),
        (Self::NEED_COMPILED_GO_FILES, "NeedCompiledGoFiles"),
        (Self::NEED_IMPORTS, "NeedImports"),
        (Self::NEED_DEPS, "NeedDeps"),
        (Self::NEED_EXPORT_FILE, "NeedExportFile"),
        (Self::NEED_TYPES, "NeedTypes"),
        (Self::NEED_SYNTAX, "NeedSyntax"),
        (Self::NEED_TYPES_INFO, "NeedTypesInfo"),
        (Self::NEED_TYPES_SIZES, "NeedTypesSizes"),
        (Self::NEED_MODULE, "NeedModule"),
        (Self::NEED_EMBED_FILES, "NeedEmbedFiles"),
        (Self::NEED_EMBED_PATTERNS, "NeedEmbedPatterns"),
    ];

    pub fn contains(self, other: LoadMode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for LoadMode {
    type Output = LoadMode;

    fn bitor(self, rhs: LoadMode) -> LoadMode {
        LoadMode(self.0 | rhs.0)
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        let mut parts = Vec::new();
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                parts.push(name.to_string());
                rest &= !flag.0;
            }
        }
        if rest != 0 {
            parts.push(format!("{:#x}", rest));
        }
        write!(f, "LoadMode({})", parts.join("|"))
    }
}

/// Virtual file content supplied by the client.
///
/// Byte slices usually arrive base64 encoded; some clients send a plain
/// byte array instead. The driver never decodes either form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum OverlayContent {
    Encoded(String),
    Bytes(
        #[serde(with = "serde_bytes")]
        #[schemars(with = "Vec<u8>")]
        Vec<u8>,
    ),
}

impl OverlayContent {
    pub fn len(&self) -> usize {
        match self {
            OverlayContent::Encoded(s) => s.len(),
            OverlayContent::Bytes(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DriverRequest {
    pub mode: LoadMode,
    #[serde(deserialize_with = "nullable")]
    pub env: Vec<String>,
    #[serde(alias = "build-flags", deserialize_with = "nullable")]
    pub build_flags: Vec<String>,
    pub tests: bool,
    #[serde(deserialize_with = "nullable")]
    pub overlay: BTreeMap<String, OverlayContent>,
    /// Query patterns carried in the request body; command-line patterns
    /// are appended after these.
    #[serde(deserialize_with = "nullable")]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DriverResponse {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<PackageId>,
    #[serde(default, deserialize_with = "nullable")]
    pub packages: Vec<PackageDescriptor>,
}

impl DriverResponse {
    pub fn package(&self, id: &str) -> Option<&PackageDescriptor> {
        self.packages.iter().find(|p| p.id.as_str() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_mode_display() {
        let mode = LoadMode::NEED_NAME | LoadMode::NEED_IMPORTS;
        assert_eq!(mode.to_string(), "LoadMode(NeedName|NeedImports)");
        assert_eq!(LoadMode(1 << 40).to_string(), "LoadMode(0x10000000000)");
    }

    #[test]
    fn test_request_defaults_and_nulls() {
        let req: DriverRequest = serde_json::from_str(
            r#"{"mode": 15, "env": null, "build_flags": ["-tags=x"], "tests": true, "overlay": null}"#,
        )
        .unwrap();
        assert!(req.mode.contains(LoadMode::NEED_FILES));
        assert!(req.env.is_empty());
        assert_eq!(req.build_flags, vec!["-tags=x"]);
        assert!(req.tests);
        assert!(req.overlay.is_empty());
        assert!(req.patterns.is_empty());

        let empty: DriverRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, DriverRequest::default());
    }

    #[test]
    fn test_request_overlay_forms() {
        let req: DriverRequest = serde_json::from_str(
            r#"{"build-flags": [], "overlay": {"/a/a.gno": "cGFja2FnZSBh", "/a/b.gno": [112, 97]}}"#,
        )
        .unwrap();
        assert_eq!(
            req.overlay["/a/a.gno"],
            OverlayContent::Encoded("cGFja2FnZSBh".to_string())
        );
        assert_eq!(req.overlay["/a/b.gno"], OverlayContent::Bytes(vec![112, 97]));
    }

    #[test]
    fn test_response_omits_empty_roots() {
        let json = serde_json::to_string(&DriverResponse::default()).unwrap();
        assert_eq!(json, r#"{"Packages":[]}"#);
    }
}
