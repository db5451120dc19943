//! Form XObjects for reusable PDF content with transformation support.
//!
//! A Form XObject is a self-contained content container that is written once and
//! then referenced wherever it is needed. Letters use one for the watermark: the
//! issuer/club text is drawn into a single form, and every page places that form
//! on a rotated grid so the tiling is identical on every page.
//!
//! Form XObjects use PDF's coordinate system where (0, 0) is at the bottom-left.
//! When placed on a page, the form's origin aligns with the page origin unless
//! a transformation is applied.

use crate::content::render_contents;
use crate::font::Font;
use crate::image::Image;
use crate::page::{write_resources, PageContents, SpanLayout};
use crate::rect::Rect;
use crate::refs::{ObjectReferences, RefType};
use crate::transform::Transform;
use crate::units::*;
use crate::PDFError;
use id_arena::{Arena, Id};
use pdf_writer::{Finish, Pdf};

/// A reusable content container that can be placed on pages with transformations.
#[derive(Debug)]
pub struct FormXObject {
    /// Bounding box of the form content
    pub bbox: Rect,
    /// Content to render (same types as Page)
    pub contents: Vec<PageContents>,
}

impl FormXObject {
    /// An empty form anchored at the origin
    pub fn new(width: Pt, height: Pt) -> Self {
        Self::from_bbox(Rect::from_origin(Pt(0.0), Pt(0.0), width, height))
    }

    /// An empty form whose content may extend below or left of its origin, as
    /// text with descenders does
    pub fn from_bbox(bbox: Rect) -> Self {
        FormXObject {
            bbox,
            contents: Vec::new(),
        }
    }

    pub fn add_span(&mut self, span: SpanLayout) {
        self.contents.push(PageContents::Text(vec![span]));
    }

    /// Write this Form XObject to the PDF using a pre-generated ref.
    pub(crate) fn write_with_ref(
        &self,
        refs: &ObjectReferences,
        xobj_index: usize,
        fonts: &Arena<Font>,
        images: &Arena<Image>,
        all_form_xobjects: &Arena<FormXObject>,
        writer: &mut Pdf,
    ) -> Result<(), PDFError> {
        let xobj_ref = refs
            .get(RefType::FormXObject(xobj_index))
            .expect("FormXObject ref should be pre-generated");

        let rendered = render_contents(&self.contents, fonts)?;
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            &rendered,
            miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
        );

        let mut xobj = writer.form_xobject(xobj_ref, &compressed);
        xobj.filter(pdf_writer::Filter::FlateDecode);
        xobj.bbox(self.bbox.into());

        let mut resources = xobj.resources();
        write_resources(&mut resources, refs, fonts, images, all_form_xobjects, &[]);
        resources.finish();

        Ok(())
    }
}

/// Specifies how to place a Form XObject on a page.
#[derive(Debug, Clone)]
pub struct FormXObjectLayout {
    /// The Form XObject to place (obtained from [`Document::add_form_xobject`](crate::Document::add_form_xobject))
    pub xobj_id: Id<FormXObject>,
    /// Transformation matrix applied when rendering this placement
    pub transform: Transform,
    /// Constant fill and stroke alpha for the placement, opaque when [None]
    pub opacity: Option<f32>,
}

impl FormXObjectLayout {
    pub fn new(xobj_id: Id<FormXObject>, transform: Transform) -> Self {
        FormXObjectLayout {
            xobj_id,
            transform,
            opacity: None,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }
}
