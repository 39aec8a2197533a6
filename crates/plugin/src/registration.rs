use crate::cap::{FileMatcherCap, HeaderScanCap, ManifestCap};
use gnodriver_api::models::Language;
use std::sync::Arc;

#[derive(Clone)]
pub struct LanguageCaps {
    pub language: Language,
    pub matcher: Arc<dyn FileMatcherCap>,
    pub header: Arc<dyn HeaderScanCap>,
    pub manifest: Arc<dyn ManifestCap>,
}
