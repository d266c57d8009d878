//! Catalog pipeline: template generation, locale merge, context annotation,
//! translation transfer and statistics over gettext PO catalogs.

pub mod annotate;
pub mod build;
pub mod po;
pub mod stats;

pub use annotate::{
    CONTEXT_LABEL, MSG_CONTEXT_LABEL, MSG_ID_LABEL, TransferResult, annotate_context,
    restore_transfer, transfer_translations,
};
pub use build::{
    BuildResult, LocaleCatalog, MergeResult, MergeTool, Msgmerge, TEMPLATE_FILE_NAME,
    build_catalogs, build_template, catalog_headers, locale_catalog_path, merge_into_locale,
};
pub use po::{Catalog, CatalogItem};
pub use stats::{CatalogStats, catalog_stats};
