use crate::{
    content::opacity_key,
    font::Font,
    form_xobject::FormXObject,
    image::Image,
    info::Info,
    page::{Page, PageContents},
    refs::{ObjectReferences, RefType},
    PDFError,
};
use id_arena::{Arena, Id};
use pdf_writer::{Finish, Pdf, Ref};
use std::collections::BTreeSet;

#[derive(Default)]
/// A document is the main object that stores all the contents of the PDF
/// then renders it out with a call to [Document::to_bytes]
pub struct Document {
    pub info: Option<Info>,
    pub pages: Arena<Page>,
    pub page_order: Vec<Id<Page>>,
    pub fonts: Arena<Font>,
    pub images: Arena<Image>,
    pub form_xobjects: Arena<FormXObject>,
}

impl Document {
    /// Sets information about the document. If not provided, no information block will be
    /// written to the PDF
    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    /// Add a page to the end of the document, returning its ID
    pub fn add_page(&mut self, page: Page) -> Id<Page> {
        let id = self.pages.alloc(page);
        self.page_order.push(id);
        id
    }

    /// Iterate over the pages in document order
    pub fn ordered_pages(&self) -> impl Iterator<Item = &Page> {
        self.page_order.iter().filter_map(|id| self.pages.get(*id))
    }

    /// Add a font to the document structure. Fonts are stored "globally" within the
    /// document, such that any page can refer to it by its ID.
    pub fn add_font(&mut self, font: Font) -> Id<Font> {
        self.fonts.alloc(font)
    }

    /// Add an image to the document structure, to be placed on any page by its ID
    pub fn add_image(&mut self, image: Image) -> Id<Image> {
        self.images.alloc(image)
    }

    /// Add a Form XObject to the document structure. Form XObjects are reusable content
    /// containers that can be placed on pages with transformations.
    pub fn add_form_xobject(&mut self, form: FormXObject) -> Id<FormXObject> {
        self.form_xobjects.alloc(form)
    }

    /// Every distinct placement opacity used on any page, by whole percent
    fn opacities(&self) -> Vec<u8> {
        let used: BTreeSet<u8> = self
            .pages
            .iter()
            .flat_map(|(_, page)| page.contents.iter())
            .filter_map(|content| match content {
                PageContents::FormXObject(layout) => layout.opacity.map(opacity_key),
                _ => None,
            })
            .collect();
        used.into_iter().collect()
    }

    /// Render the document into an in-memory byte buffer
    pub fn to_bytes(self) -> Result<Vec<u8>, PDFError> {
        let opacities = self.opacities();
        let Document {
            info,
            pages,
            page_order,
            fonts,
            images,
            form_xobjects,
        } = self;

        let mut refs = ObjectReferences::new();

        let catalog_id = refs.gen(RefType::Catalog);
        let page_tree_id = refs.gen(RefType::PageTree);

        let mut writer = Pdf::new();
        if let Some(info) = info {
            info.write(&mut refs, &mut writer);
        }

        // page refs are keyed by page_order index (not arena index)
        let page_refs: Vec<Ref> = page_order
            .iter()
            .enumerate()
            .map(|(i, _id)| refs.gen(RefType::Page(i)))
            .collect();

        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs);

        for (i, (_, font)) in fonts.iter().enumerate() {
            font.write(&mut refs, i, &mut writer);
        }

        for (i, (_, image)) in images.iter().enumerate() {
            image.write(&mut refs, i, &mut writer)?;
        }

        for &opacity in opacities.iter() {
            let id = refs.gen(RefType::ExtGState(opacity));
            let alpha = opacity as f32 / 100.0;
            writer
                .ext_graphics(id)
                .non_stroking_alpha(alpha)
                .stroking_alpha(alpha);
        }

        // pre-generate refs for all form xobjects before writing any of them
        // this allows form xobjects to reference each other
        for (i, _) in form_xobjects.iter().enumerate() {
            refs.gen(RefType::FormXObject(i));
        }

        for (i, (_, xobj)) in form_xobjects.iter().enumerate() {
            xobj.write_with_ref(&refs, i, &fonts, &images, &form_xobjects, &mut writer)?;
        }

        for (page_index, id) in page_order.iter().enumerate() {
            let page = pages.get(*id).ok_or(PDFError::PageMissing)?;
            page.write(
                &mut refs,
                page_index,
                &fonts,
                &images,
                &form_xobjects,
                &opacities,
                &mut writer,
            )?;
        }

        let mut catalog = writer.catalog(catalog_id);
        catalog.pages(page_tree_id);
        catalog.finish();

        Ok(writer.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::StandardFace;
    use crate::form_xobject::FormXObjectLayout;
    use crate::page::{LinkAnnotation, SpanFont, SpanLayout};
    use crate::transform::Transform;
    use crate::{colours, pagesize, Pt, Rect};

    fn sample() -> Document {
        let mut doc = Document::default();
        let font = doc.add_font(Font::standard(StandardFace::Helvetica));
        let mut form = FormXObject::new(Pt(100.0), Pt(20.0));
        form.add_span(SpanLayout {
            text: "mark".into(),
            font: SpanFont { id: font, size: Pt(10.0) },
            colour: colours::BLACK,
            coords: (Pt(0.0), Pt(5.0)),
        });
        let form = doc.add_form_xobject(form);

        for n in 0..2 {
            let mut page = Page::new(pagesize::A4, None);
            page.add_form_xobject(
                FormXObjectLayout::new(form, Transform::identity()).with_opacity(0.3),
            );
            page.add_span(SpanLayout {
                text: format!("page {n}"),
                font: SpanFont { id: font, size: Pt(12.0) },
                colour: colours::BLACK,
                coords: (Pt(50.0), Pt(700.0)),
            });
            page.add_link(LinkAnnotation {
                rect: Rect::from_origin(Pt(50.0), Pt(700.0), Pt(40.0), Pt(12.0)),
                uri: "https://example.com".into(),
            });
            doc.add_page(page);
        }
        doc
    }

    #[test]
    fn writes_a_parseable_document() {
        let bytes = sample().to_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let parsed = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 2);
    }

    #[test]
    fn links_become_uri_annotations() {
        let bytes = sample().to_bytes().unwrap();
        let parsed = lopdf::Document::load_mem(&bytes).unwrap();
        for (_, page_id) in parsed.get_pages() {
            let page = parsed.get_dictionary(page_id).unwrap();
            let annots = page.get(b"Annots").unwrap().as_array().unwrap();
            assert_eq!(annots.len(), 1);
            let annot = parsed
                .get_dictionary(annots[0].as_reference().unwrap())
                .unwrap();
            assert_eq!(annot.get(b"Subtype").unwrap().as_name().unwrap(), b"Link");
        }
    }

    #[test]
    fn shared_opacity_is_written_once() {
        let doc = sample();
        assert_eq!(doc.opacities(), vec![30]);
    }
}
