//! Saved document-text-detection responses from a remote recognizer.
//!
//! Failures here never reach the pipeline: a response that cannot be read or
//! parsed, or whose geometry is incomplete, becomes a page with no regions.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::error::Result;
use crate::core::geometry::Rectangle;
use crate::core::model::{Page, Region};
use crate::source::RegionSource;

#[derive(Debug, Error)]
enum MalformedResponse {
    #[error("response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("recognizer reported an error: {0}")]
    Remote(String),
    #[error("block {0} has no bounding box vertices")]
    NoVertices(usize),
    #[error("block {0} has a missing or negative vertex coordinate")]
    BadVertex(usize),
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    responses: Vec<AnnotateResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResponse {
    full_text_annotation: Option<TextAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    pages: Vec<AnnotatedPage>,
}

#[derive(Debug, Deserialize)]
struct AnnotatedPage {
    #[serde(default)]
    blocks: Vec<Block>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Block {
    bounding_box: Option<BoundingPoly>,
    #[serde(default)]
    paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Deserialize)]
struct BoundingPoly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

#[derive(Debug, Deserialize)]
struct Vertex {
    x: Option<i64>,
    y: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Paragraph {
    #[serde(default)]
    words: Vec<Word>,
}

#[derive(Debug, Deserialize)]
struct Word {
    #[serde(default)]
    symbols: Vec<Symbol>,
}

#[derive(Debug, Deserialize)]
struct Symbol {
    #[serde(default)]
    text: String,
}

/// Extracts one region per detected block. Any malformed input yields an
/// empty list.
pub fn parse_response(body: &str) -> Vec<Region> {
    match try_parse(body) {
        Ok(regions) => regions,
        Err(err) => {
            warn!(error = %err, "dropping recognition response");
            Vec::new()
        }
    }
}

fn try_parse(body: &str) -> std::result::Result<Vec<Region>, MalformedResponse> {
    let batch: BatchResponse = serde_json::from_str(body)?;
    let Some(response) = batch.responses.into_iter().next() else {
        return Ok(Vec::new());
    };
    if let Some(status) = response.error {
        return Err(MalformedResponse::Remote(status.message));
    }
    let Some(annotation) = response.full_text_annotation else {
        debug!("response carries no text annotation");
        return Ok(Vec::new());
    };

    annotation
        .pages
        .iter()
        .flat_map(|page| page.blocks.iter())
        .enumerate()
        .map(|(idx, block)| block_to_region(idx, block))
        .collect()
}

fn block_to_region(idx: usize, block: &Block) -> std::result::Result<Region, MalformedResponse> {
    let vertices = block
        .bounding_box
        .as_ref()
        .map(|poly| poly.vertices.as_slice())
        .unwrap_or_default();
    if vertices.is_empty() {
        return Err(MalformedResponse::NoVertices(idx));
    }

    let mut points = Vec::with_capacity(vertices.len());
    for vertex in vertices {
        match (vertex.x, vertex.y) {
            (Some(x), Some(y)) if x >= 0 && y >= 0 => points.push((x, y)),
            _ => return Err(MalformedResponse::BadVertex(idx)),
        }
    }

    let (mut min_x, mut min_y) = points[0];
    let (mut max_x, mut max_y) = points[0];
    for &(x, y) in &points[1..] {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    let text = block
        .paragraphs
        .iter()
        .flat_map(|paragraph| paragraph.words.iter())
        .flat_map(|word| word.symbols.iter())
        .map(|symbol| symbol.text.as_str())
        .collect::<String>();

    Ok(Region::new(
        Rectangle::new(min_x, min_y, max_x - min_x, max_y - min_y),
        text,
    ))
}

/// Treats each saved response file as one page, numbered in list order.
#[derive(Debug, Clone)]
pub struct VisionRegionSource {
    files: Vec<PathBuf>,
}

impl VisionRegionSource {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }
}

impl RegionSource for VisionRegionSource {
    fn load(&self) -> Result<Vec<Page>> {
        let pages = self
            .files
            .iter()
            .enumerate()
            .map(|(page_id, path)| {
                let regions = match std::fs::read_to_string(path) {
                    Ok(body) => parse_response(&body),
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "failed to read response");
                        Vec::new()
                    }
                };
                Page::new(path.to_string_lossy(), page_id as i64, regions)
            })
            .collect();
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RESPONSE: &str = r#"{
      "responses": [{
        "fullTextAnnotation": {
          "pages": [{
            "blocks": [
              {
                "boundingBox": {"vertices": [{"x": 10, "y": 20}, {"x": 40, "y": 20}, {"x": 40, "y": 90}, {"x": 10, "y": 90}]},
                "paragraphs": [
                  {"words": [{"symbols": [{"text": "よ"}, {"text": "ろ"}]}]},
                  {"words": [{"symbols": [{"text": "し"}]}, {"symbols": [{"text": "く"}]}]}
                ]
              },
              {
                "boundingBox": {"vertices": [{"x": 100, "y": 5}, {"x": 130, "y": 8}, {"x": 128, "y": 60}, {"x": 98, "y": 58}]},
                "paragraphs": []
              }
            ]
          }]
        }
      }]
    }"#;

    #[test]
    fn parses_blocks_into_regions() {
        assert_eq!(
            parse_response(RESPONSE),
            vec![
                Region::new(Rectangle::new(10, 20, 30, 70), "よろしく"),
                Region::new(Rectangle::new(98, 5, 32, 55), ""),
            ]
        );
    }

    #[test]
    fn missing_coordinate_drops_the_page() {
        let body = RESPONSE.replace(r#"{"x": 10, "y": 20}"#, r#"{"y": 20}"#);
        assert!(parse_response(&body).is_empty());
    }

    #[test]
    fn negative_coordinate_drops_the_page() {
        let body = RESPONSE.replace(r#"{"x": 100, "y": 5}"#, r#"{"x": -1, "y": 5}"#);
        assert!(parse_response(&body).is_empty());
    }

    #[test]
    fn errors_and_garbage_yield_no_regions() {
        assert!(parse_response("not json").is_empty());
        assert!(parse_response(r#"{"responses": [{"error": {"message": "quota"}}]}"#).is_empty());
        assert!(parse_response(r#"{"responses": [{}]}"#).is_empty());
        assert!(parse_response(r#"{"responses": []}"#).is_empty());
    }

    #[test]
    fn unreadable_file_becomes_empty_page() -> Result<()> {
        let source = VisionRegionSource::new(vec![PathBuf::from("/nonexistent/response.json")]);
        let pages = source.load()?;
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_id, 0);
        assert!(pages[0].regions.is_empty());
        Ok(())
    }
}
