pub mod annotation_xml;
pub mod csv_store;
pub mod vision;

pub use annotation_xml::{find_annotation_files, AnnotationXmlSource};
pub use csv_store::{read_pages, write_pages, CsvRegionSource};
pub use vision::VisionRegionSource;

use crate::core::error::Result;
use crate::core::model::Page;

/// Anything that can produce per-page region records.
pub trait RegionSource {
    fn load(&self) -> Result<Vec<Page>>;
}
