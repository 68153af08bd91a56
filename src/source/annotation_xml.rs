//! Hand-made reference annotations, one XML document per page image.
//!
//! Each document carries a `PageData` element with the image `FileName`, its
//! pixel `ImageSize` and a `DialogData` list. Every dialog holds a
//! `Coordinate` polygon of points whose `X`/`Y` are normalized to `[0, 1]`,
//! plus the transcribed `Text`. Polygons are scaled to pixels and reduced to
//! their axis-aligned bounding box.

use std::fs;
use std::path::PathBuf;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;

use crate::core::error::{Result, SourceError};
use crate::core::geometry::Rectangle;
use crate::core::model::{Page, Region};
use crate::source::RegionSource;

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("missing <{0}> element")]
    Missing(&'static str),
    #[error("invalid number {value:?} in <{element}>")]
    Number { element: &'static str, value: String },
    #[error("point {point} of dialog {dialog} lacks an X or Y value")]
    IncompletePoint { dialog: usize, point: usize },
    #[error("dialog {0} has no coordinate points")]
    EmptyPolygon(usize),
}

#[derive(Debug, Default)]
struct Dialog {
    points: Vec<(f64, f64)>,
    text: String,
}

#[derive(Debug, Default)]
struct ParseState {
    file_name: Option<String>,
    width: Option<i64>,
    height: Option<i64>,
    dialogs: Vec<Dialog>,
    x: Option<f64>,
    y: Option<f64>,
    page_done: bool,
    dialogs_done: bool,
}

impl ParseState {
    fn open(&mut self, path: &[String]) {
        match path {
            [list, _] if list == "DialogData" && !self.dialogs_done => {
                self.dialogs.push(Dialog::default());
            }
            [list, _, coordinate, _] if list == "DialogData" && coordinate == "Coordinate" => {
                self.x = None;
                self.y = None;
            }
            _ => {}
        }
    }

    fn close(&mut self, path: &[String], text: &str) -> std::result::Result<(), AnnotationError> {
        let names: Vec<&str> = path.iter().map(String::as_str).collect();
        match names.as_slice() {
            ["FileName"] => self.file_name = Some(text.trim().to_string()),
            ["ImageSize", "Width"] => self.width = Some(parse_number("Width", text)?),
            ["ImageSize", "Height"] => self.height = Some(parse_number("Height", text)?),
            ["DialogData"] => self.dialogs_done = true,
            _ if self.dialogs_done => {}
            ["DialogData", _, "Coordinate", _, "X"] => self.x = Some(parse_number("X", text)?),
            ["DialogData", _, "Coordinate", _, "Y"] => self.y = Some(parse_number("Y", text)?),
            ["DialogData", _, "Coordinate", _] => {
                let dialog_idx = self.dialogs.len().saturating_sub(1);
                let Some(dialog) = self.dialogs.last_mut() else {
                    return Ok(());
                };
                match (self.x.take(), self.y.take()) {
                    (Some(x), Some(y)) => dialog.points.push((x, y)),
                    _ => {
                        return Err(AnnotationError::IncompletePoint {
                            dialog: dialog_idx,
                            point: dialog.points.len(),
                        })
                    }
                }
            }
            ["DialogData", _, "Text"] => {
                if let Some(dialog) = self.dialogs.last_mut() {
                    dialog.text = text.to_string();
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(
    element: &'static str,
    text: &str,
) -> std::result::Result<T, AnnotationError> {
    text.trim().parse().map_err(|_| AnnotationError::Number {
        element,
        value: text.to_string(),
    })
}

/// Bounding box of a normalized polygon scaled to a `width` x `height` image.
/// Scaled coordinates truncate toward zero.
fn scale_polygon(points: &[(f64, f64)], width: i64, height: i64) -> Option<Rectangle> {
    let scaled: Vec<(i64, i64)> = points
        .iter()
        .map(|&(x, y)| ((x * width as f64) as i64, (y * height as f64) as i64))
        .collect();
    let min_x = scaled.iter().map(|p| p.0).min()?;
    let min_y = scaled.iter().map(|p| p.1).min()?;
    let max_x = scaled.iter().map(|p| p.0).max()?;
    let max_y = scaled.iter().map(|p| p.1).max()?;
    Some(Rectangle::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Parses one annotation document into a page. Only the first `PageData`
/// and its first `DialogData` list are read.
pub fn parse_annotation(content: &str, page_id: i64) -> std::result::Result<Page, AnnotationError> {
    let mut reader = Reader::from_str(content);
    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut state = ParseState::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                stack.push(String::from_utf8_lossy(e.local_name().as_ref()).to_string());
                if let Some(path) = page_path(&stack, &state) {
                    state.open(path);
                }
                text.clear();
            }
            Event::Empty(e) => {
                stack.push(String::from_utf8_lossy(e.local_name().as_ref()).to_string());
                if let Some(path) = page_path(&stack, &state) {
                    state.open(path);
                    state.close(path, "")?;
                }
                stack.pop();
                text.clear();
            }
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::End(_) => {
                if let Some(path) = page_path(&stack, &state) {
                    if path.is_empty() {
                        state.page_done = true;
                    } else {
                        state.close(path, &text)?;
                    }
                }
                stack.pop();
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let source = state.file_name.ok_or(AnnotationError::Missing("FileName"))?;
    let width = state.width.ok_or(AnnotationError::Missing("Width"))?;
    let height = state.height.ok_or(AnnotationError::Missing("Height"))?;

    let regions = state
        .dialogs
        .into_iter()
        .enumerate()
        .map(|(idx, dialog)| {
            let rectangle = scale_polygon(&dialog.points, width, height)
                .ok_or(AnnotationError::EmptyPolygon(idx))?;
            Ok(Region::new(rectangle, dialog.text))
        })
        .collect::<std::result::Result<Vec<_>, AnnotationError>>()?;

    Ok(Page::new(source, page_id, regions))
}

/// The element path below the first `PageData`, or `None` outside of it.
fn page_path<'a>(stack: &'a [String], state: &ParseState) -> Option<&'a [String]> {
    if state.page_done {
        return None;
    }
    let pos = stack.iter().position(|name| name == "PageData")?;
    Some(&stack[pos + 1..])
}

/// Annotation documents loaded in the given order; page ids are positions.
#[derive(Debug, Clone)]
pub struct AnnotationXmlSource {
    files: Vec<PathBuf>,
}

impl AnnotationXmlSource {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }
}

impl RegionSource for AnnotationXmlSource {
    fn load(&self) -> Result<Vec<Page>> {
        let mut pages = Vec::with_capacity(self.files.len());
        for (page_id, path) in self.files.iter().enumerate() {
            let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
                path: path.clone(),
                source,
            })?;
            let page = parse_annotation(&content, page_id as i64).map_err(|source| {
                SourceError::Annotation {
                    path: path.clone(),
                    source,
                }
            })?;
            debug!(path = %path.display(), regions = page.regions.len(), "parsed annotation");
            pages.push(page);
        }
        Ok(pages)
    }
}

/// Files directly inside each directory whose extension matches, sorted by
/// path within each directory.
pub fn find_annotation_files(directories: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for dir in directories {
        let io_error = |source: std::io::Error| SourceError::Io {
            path: dir.clone(),
            source,
        };
        let mut found = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
                found.push(path);
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}
