use crate::colour::Colour;
use crate::content::render_contents;
use crate::font::Font;
use crate::form_xobject::{FormXObject, FormXObjectLayout};
use crate::image::Image;
use crate::layout::Margins;
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::refs::{ObjectReferences, RefType};
use crate::units::*;
use crate::PDFError;
use id_arena::{Arena, Id};
use pdf_writer::types::{ActionType, AnnotationType};
use pdf_writer::{Finish, Name, Pdf, Ref, Str};

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SpanFont {
    pub id: Id<Font>,
    pub size: Pt,
}

/// A run of text drawn starting at a baseline coordinate
#[derive(Clone, PartialEq, Debug)]
pub struct SpanLayout {
    pub text: String,
    pub font: SpanFont,
    pub colour: Colour,
    pub coords: (Pt, Pt),
}

#[derive(Clone, PartialEq, Debug)]
pub struct ImageLayout {
    pub image_id: Id<Image>,
    pub position: Rect,
}

/// A straight stroked line, used for underlines and strikethroughs
#[derive(Clone, PartialEq, Debug)]
pub struct LineLayout {
    pub from: (Pt, Pt),
    pub to: (Pt, Pt),
    pub width: Pt,
    pub colour: Colour,
}

/// A filled rectangle, used behind highlighted text
#[derive(Clone, PartialEq, Debug)]
pub struct RectLayout {
    pub rect: Rect,
    pub colour: Colour,
}

#[derive(Debug)]
pub enum PageContents {
    Text(Vec<SpanLayout>),
    Image(ImageLayout),
    FormXObject(FormXObjectLayout),
    Line(LineLayout),
    Rect(RectLayout),
}

/// A clickable region that opens a URI
#[derive(Clone, PartialEq, Debug)]
pub struct LinkAnnotation {
    pub rect: Rect,
    pub uri: String,
}

#[derive(Debug)]
pub struct Page {
    /// The size of the page
    pub media_box: Rect,
    /// Where content can live, i.e. within the margins
    pub content_box: Rect,
    /// Everything drawn on the page, in painting order
    pub contents: Vec<PageContents>,
    /// Link annotations attached to the page
    pub links: Vec<LinkAnnotation>,
}

impl Page {
    /// Create a new page of the given size. Without margins the content box covers
    /// the whole page.
    pub fn new(size: PageSize, margins: Option<Margins>) -> Page {
        let (width, height) = size;
        let margins = margins.unwrap_or_else(Margins::empty);
        Page {
            media_box: Rect::from_origin(Pt(0.0), Pt(0.0), width, height),
            content_box: Rect {
                x1: margins.left,
                y1: margins.bottom,
                x2: width - margins.right,
                y2: height - margins.top,
            },
            contents: Vec::default(),
            links: Vec::default(),
        }
    }

    pub fn add_span(&mut self, span: SpanLayout) {
        self.contents.push(PageContents::Text(vec![span]));
    }

    pub fn add_image(&mut self, image: ImageLayout) {
        self.contents.push(PageContents::Image(image));
    }

    /// Place a Form XObject on the page
    pub fn add_form_xobject(&mut self, layout: FormXObjectLayout) {
        self.contents.push(PageContents::FormXObject(layout));
    }

    pub fn add_line(&mut self, line: LineLayout) {
        self.contents.push(PageContents::Line(line));
    }

    pub fn add_rect(&mut self, rect: RectLayout) {
        self.contents.push(PageContents::Rect(rect));
    }

    pub fn add_link(&mut self, link: LinkAnnotation) {
        self.links.push(link);
    }

    /// All text drawn on the page, in painting order
    pub fn spans(&self) -> impl Iterator<Item = &SpanLayout> {
        self.contents.iter().flat_map(|c| match c {
            PageContents::Text(spans) => spans.as_slice(),
            _ => &[],
        })
    }

    fn render(&self, fonts: &Arena<Font>) -> Result<Vec<u8>, std::io::Error> {
        render_contents(&self.contents, fonts)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        fonts: &Arena<Font>,
        images: &Arena<Image>,
        form_xobjects: &Arena<FormXObject>,
        opacities: &[u8],
        writer: &mut Pdf,
    ) -> Result<(), PDFError> {
        let id = refs
            .get(RefType::Page(page_index))
            .expect("page refs are generated before pages are written");
        let page_tree = refs
            .get(RefType::PageTree)
            .expect("page tree ref is generated first");

        let annotation_ids: Vec<Ref> = (0..self.links.len())
            .map(|i| refs.gen(RefType::Annotation(page_index, i)))
            .collect();
        let content_id = refs.gen(RefType::ContentForPage(page_index));

        let mut page = writer.page(id);
        page.media_box(self.media_box.into());
        page.art_box(self.content_box.into());
        page.parent(page_tree);

        let mut resources = page.resources();
        write_resources(&mut resources, refs, fonts, images, form_xobjects, opacities);
        resources.finish();

        if !annotation_ids.is_empty() {
            page.annotations(annotation_ids.iter().copied());
        }
        page.contents(content_id);
        page.finish();

        for (link, annotation_id) in self.links.iter().zip(annotation_ids) {
            let mut annotation = writer.annotation(annotation_id);
            annotation.subtype(AnnotationType::Link);
            annotation.rect(link.rect.into());
            annotation.border(0.0, 0.0, 0.0, None);
            annotation
                .action()
                .action_type(ActionType::Uri)
                .uri(Str(link.uri.as_bytes()));
        }

        let rendered = self.render(fonts)?;
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(
            &rendered,
            miniz_oxide::deflate::CompressionLevel::DefaultCompression as u8,
        );
        writer
            .stream(content_id, compressed.as_slice())
            .filter(pdf_writer::Filter::FlateDecode);

        Ok(())
    }
}

/// Name every font, image, form and graphics state in the document so that any
/// content stream can refer to them as `/F{n}`, `/I{n}`, `/X{n}` and `/GS{opacity}`
pub(crate) fn write_resources(
    resources: &mut pdf_writer::writers::Resources,
    refs: &ObjectReferences,
    fonts: &Arena<Font>,
    images: &Arena<Image>,
    form_xobjects: &Arena<FormXObject>,
    opacities: &[u8],
) {
    let mut resource_fonts = resources.fonts();
    for (i, _) in fonts.iter().enumerate() {
        if let Some(font_ref) = refs.get(RefType::Font(i)) {
            resource_fonts.pair(Name(format!("F{i}").as_bytes()), font_ref);
        }
    }
    resource_fonts.finish();

    let mut resource_xobjects = resources.x_objects();
    for (i, _) in images.iter().enumerate() {
        if let Some(image_ref) = refs.get(RefType::Image(i)) {
            resource_xobjects.pair(Name(format!("I{i}").as_bytes()), image_ref);
        }
    }
    for (i, _) in form_xobjects.iter().enumerate() {
        if let Some(form_ref) = refs.get(RefType::FormXObject(i)) {
            resource_xobjects.pair(Name(format!("X{i}").as_bytes()), form_ref);
        }
    }
    resource_xobjects.finish();

    if !opacities.is_empty() {
        let mut states = resources.ext_g_states();
        for &opacity in opacities {
            if let Some(state_ref) = refs.get(RefType::ExtGState(opacity)) {
                states.pair(Name(format!("GS{opacity}").as_bytes()), state_ref);
            }
        }
        states.finish();
    }
}
