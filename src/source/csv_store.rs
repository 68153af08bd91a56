use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{Result, SourceError};
use crate::core::geometry::Rectangle;
use crate::core::model::{Page, PageKey, Region};
use crate::source::RegionSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PageRow {
    source: String,
    page_id: i64,
    #[serde(default)]
    frames: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FrameRow {
    source: String,
    page_id: i64,
    #[serde(default)]
    frame_id: Option<usize>,
    #[serde(rename = "startX")]
    start_x: i64,
    #[serde(rename = "startY")]
    start_y: i64,
    width: i64,
    height: i64,
    #[serde(default)]
    text: Option<String>,
}

/// A pair of `pages.csv` / `frames.csv` files.
#[derive(Debug, Clone)]
pub struct CsvRegionSource {
    pages_path: PathBuf,
    frames_path: PathBuf,
}

impl CsvRegionSource {
    pub fn new(pages_path: PathBuf, frames_path: PathBuf) -> Self {
        Self {
            pages_path,
            frames_path,
        }
    }
}

impl RegionSource for CsvRegionSource {
    fn load(&self) -> Result<Vec<Page>> {
        read_pages(&self.pages_path, &self.frames_path)
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new().flexible(true).from_reader(file))
}

fn csv_error(path: &Path) -> impl Fn(csv::Error) -> SourceError + '_ {
    move |source| SourceError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Loads pages in `pages.csv` order, attaching the frames that share their
/// `(source, page_id)`. Frames keep their file order; pages with no frames
/// get an empty region list.
pub fn read_pages(pages_path: &Path, frames_path: &Path) -> Result<Vec<Page>> {
    let mut frames: HashMap<PageKey, Vec<Region>> = HashMap::new();
    let mut reader = open_reader(frames_path)?;
    for (idx, row) in reader.deserialize::<FrameRow>().enumerate() {
        let row = row.map_err(csv_error(frames_path))?;
        if row.width < 0 || row.height < 0 {
            return Err(SourceError::NegativeGeometry {
                path: frames_path.to_path_buf(),
                // header is line 1
                row: idx + 2,
                width: row.width,
                height: row.height,
            });
        }
        frames
            .entry(PageKey::new(row.source, row.page_id))
            .or_default()
            .push(Region::new(
                Rectangle::new(row.start_x, row.start_y, row.width, row.height),
                row.text.unwrap_or_default(),
            ));
    }

    let mut pages = Vec::new();
    let mut reader = open_reader(pages_path)?;
    for row in reader.deserialize::<PageRow>() {
        let row = row.map_err(csv_error(pages_path))?;
        let key = PageKey::new(row.source, row.page_id);
        let regions = frames.remove(&key).unwrap_or_default();
        pages.push(Page::new(key.source, key.page_id, regions));
    }

    debug!(
        pages = pages.len(),
        orphan_frame_groups = frames.len(),
        path = %pages_path.display(),
        "loaded region store"
    );
    Ok(pages)
}

pub fn write_pages(pages: &[Page], pages_path: &Path, frames_path: &Path) -> Result<()> {
    let create = |path: &Path| -> Result<csv::Writer<File>> {
        let file = File::create(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(csv::Writer::from_writer(file))
    };
    let mut pages_writer = create(pages_path)?;
    let mut frames_writer = create(frames_path)?;

    for page in pages {
        pages_writer
            .serialize(PageRow {
                source: page.source.clone(),
                page_id: page.page_id,
                frames: page.regions.len(),
            })
            .map_err(csv_error(pages_path))?;
        for (frame_id, region) in page.regions.iter().enumerate() {
            let r = region.rectangle;
            frames_writer
                .serialize(FrameRow {
                    source: page.source.clone(),
                    page_id: page.page_id,
                    frame_id: Some(frame_id),
                    start_x: r.start_x,
                    start_y: r.start_y,
                    width: r.width,
                    height: r.height,
                    text: Some(region.text.clone()),
                })
                .map_err(csv_error(frames_path))?;
        }
    }

    pages_writer.flush().map_err(|source| SourceError::Io {
        path: pages_path.to_path_buf(),
        source,
    })?;
    frames_writer.flush().map_err(|source| SourceError::Io {
        path: frames_path.to_path_buf(),
        source,
    })?;
    Ok(())
}
