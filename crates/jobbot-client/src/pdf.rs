//! PDF output for tailored resumes.
//!
//! Text is laid out by [`jobbot_core::layout`] and written with the
//! built-in Helvetica font. With a template, the first template page
//! receives the overlay and overflow continues on appended pages.

use std::path::{Path, PathBuf};

use jobbot_core::error::AppError;
use jobbot_core::layout::{PageGeometry, PlacedLine, layout};
use jobbot_core::traits::DocumentRenderer;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// Resource name for the overlay font. Unlikely to collide with template fonts.
const FONT_NAME: &str = "JbHelv";

/// Resource inheritance depth followed through the page tree.
const MAX_INHERIT_DEPTH: usize = 16;

fn pdf_err(e: impl std::fmt::Display) -> AppError {
    AppError::RenderError(e.to_string())
}

#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    template: Option<PathBuf>,
    geometry: PageGeometry,
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay onto the first page of `template` when it can be loaded.
    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }

    fn build(&self, text: &str) -> Result<Document, AppError> {
        let pages = layout(text, &self.geometry);
        if let Some(template) = &self.template {
            match Document::load(template) {
                Ok(doc) => return overlay(doc, &pages, &self.geometry),
                Err(e) => tracing::warn!(
                    template = %template.display(),
                    error = %e,
                    "Could not load template, rendering plain document"
                ),
            }
        }
        fresh_document(&pages, &self.geometry)
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, text: &str, out_path: &Path) -> Result<PathBuf, AppError> {
        let mut doc = self.build(text)?;
        doc.save(out_path).map_err(pdf_err)?;
        tracing::debug!(path = %out_path.display(), "Wrote PDF");
        Ok(out_path.to_path_buf())
    }
}

fn font_dictionary() -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    }
}

fn media_box(geometry: &PageGeometry) -> Object {
    vec![0i64.into(), 0i64.into(), geometry.width.into(), geometry.height.into()].into()
}

/// Latin-1 bytes for the built-in font; anything else becomes `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn page_content(lines: &[PlacedLine], geometry: &PageGeometry) -> Result<Vec<u8>, AppError> {
    let mut operations = vec![
        Operation::new("q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(FONT_NAME.into()), geometry.font_size.into()],
        ),
    ];
    for line in lines.iter().filter(|l| !l.text.is_empty()) {
        operations.push(Operation::new(
            "Tm",
            vec![
                1i64.into(),
                0i64.into(),
                0i64.into(),
                1i64.into(),
                line.x.into(),
                line.y.into(),
            ],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_text(&line.text))],
        ));
    }
    operations.push(Operation::new("ET", vec![]));
    operations.push(Operation::new("Q", vec![]));

    Content { operations }.encode().map_err(pdf_err)
}

fn add_page(
    doc: &mut Document,
    parent: ObjectId,
    lines: &[PlacedLine],
    geometry: &PageGeometry,
    resources: Object,
) -> Result<ObjectId, AppError> {
    let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(lines, geometry)?));
    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "MediaBox" => media_box(geometry),
        "Contents" => content_id,
        "Resources" => resources,
    }))
}

fn fresh_document(
    pages: &[Vec<PlacedLine>],
    geometry: &PageGeometry,
) -> Result<Document, AppError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(font_dictionary());
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { FONT_NAME => font_id },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for lines in pages {
        let page_id = add_page(&mut doc, pages_id, lines, geometry, resources_id.into())?;
        kids.push(Object::from(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    Ok(doc)
}

/// Clone a dictionary entry, following one indirect reference.
fn resolved_dict(doc: &Document, entry: Option<&Object>) -> Result<Dictionary, AppError> {
    match entry {
        None => Ok(Dictionary::new()),
        Some(Object::Reference(id)) => doc.get_dictionary(*id).cloned().map_err(pdf_err),
        Some(Object::Dictionary(dict)) => Ok(dict.clone()),
        Some(other) => Err(AppError::RenderError(format!(
            "Unexpected resource entry: {other:?}"
        ))),
    }
}

/// Stream references making up a page's `Contents`, with an indirect array flattened.
fn content_streams(doc: &Document, entry: Option<&Object>) -> Result<Vec<Object>, AppError> {
    match entry {
        None => Ok(Vec::new()),
        Some(Object::Array(streams)) => Ok(streams.clone()),
        Some(Object::Reference(id)) => match doc.get_object(*id).map_err(pdf_err)? {
            Object::Array(streams) => Ok(streams.clone()),
            _ => Ok(vec![Object::Reference(*id)]),
        },
        Some(other) => Ok(vec![other.clone()]),
    }
}

/// Effective `Resources` of a page, including those inherited from the page tree.
fn page_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary, AppError> {
    let mut node = doc.get_dictionary(page_id).map_err(pdf_err)?;
    for _ in 0..MAX_INHERIT_DEPTH {
        if let Ok(resources) = node.get(b"Resources") {
            return resolved_dict(doc, Some(resources));
        }
        match node.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => node = doc.get_dictionary(parent).map_err(pdf_err)?,
            Err(_) => break,
        }
    }
    Ok(Dictionary::new())
}

fn overlay(
    mut doc: Document,
    pages: &[Vec<PlacedLine>],
    geometry: &PageGeometry,
) -> Result<Document, AppError> {
    let first_page = doc
        .get_pages()
        .values()
        .next()
        .copied()
        .ok_or_else(|| AppError::RenderError("Template has no pages".into()))?;
    let font_id = doc.add_object(font_dictionary());

    let (first_lines, overflow) = pages
        .split_first()
        .ok_or_else(|| AppError::RenderError("Nothing to render".into()))?;

    // First page: merge our font into its resources and append a content stream.
    let mut resources = page_resources(&doc, first_page)?;
    let mut fonts = resolved_dict(&doc, resources.get(b"Font").ok())?;
    fonts.set(FONT_NAME, font_id);
    resources.set("Font", fonts);

    let overlay_id =
        doc.add_object(Stream::new(dictionary! {}, page_content(first_lines, geometry)?));
    let page = doc.get_dictionary(first_page).map_err(pdf_err)?;
    let mut streams = content_streams(&doc, page.get(b"Contents").ok())?;
    streams.push(overlay_id.into());
    let contents = Object::Array(streams);
    let parent = page
        .get(b"Parent")
        .and_then(Object::as_reference)
        .map_err(pdf_err)?;

    let page = doc
        .get_object_mut(first_page)
        .and_then(Object::as_dict_mut)
        .map_err(pdf_err)?;
    page.set("Resources", resources);
    page.set("Contents", contents);

    if overflow.is_empty() {
        return Ok(doc);
    }

    // Overflow pages hang off the first page's parent node.
    let overflow_resources = Object::Dictionary(dictionary! {
        "Font" => dictionary! { FONT_NAME => font_id },
    });
    let mut new_kids = Vec::with_capacity(overflow.len());
    for lines in overflow {
        let id = add_page(&mut doc, parent, lines, geometry, overflow_resources.clone())?;
        new_kids.push(Object::from(id));
    }
    let added = new_kids.len() as i64;

    let parent_dict = doc
        .get_object_mut(parent)
        .and_then(Object::as_dict_mut)
        .map_err(pdf_err)?;
    let kids = parent_dict
        .get_mut(b"Kids")
        .and_then(Object::as_array_mut)
        .map_err(pdf_err)?;
    kids.extend(new_kids);
    bump_count(&mut doc, parent, added)?;

    Ok(doc)
}

/// Add `added` to `Count` on `node` and every ancestor.
fn bump_count(doc: &mut Document, mut node: ObjectId, added: i64) -> Result<(), AppError> {
    for _ in 0..MAX_INHERIT_DEPTH {
        let dict = doc
            .get_object_mut(node)
            .and_then(Object::as_dict_mut)
            .map_err(pdf_err)?;
        let count = dict.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        dict.set("Count", count + added);
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => node = parent,
            Err(_) => break,
        }
    }
    Ok(())
}
