use crate::error::ProtectionError;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Bake interactive form widgets into static page content.
///
/// Each widget with a normal appearance stream has that stream painted onto its
/// page as a Form XObject at the widget's rectangle; the widget annotations and
/// the document's AcroForm are then removed. A document without form fields is
/// returned unchanged.
pub fn flatten(pdf: &[u8]) -> Result<Vec<u8>, ProtectionError> {
    let mut doc = Document::load_mem(pdf)?;
    let root = doc.trailer.get(b"Root")?.as_reference()?;
    let has_form = doc.get_dictionary(root)?.has(b"AcroForm");

    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let mut flattened = 0;
    for page in pages {
        flattened += flatten_page(&mut doc, page)?;
    }

    if flattened == 0 && !has_form {
        log::debug!("no form fields to flatten");
        return Ok(pdf.to_vec());
    }

    if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(root) {
        catalog.remove(b"AcroForm");
    }
    log::debug!("flattened {flattened} form widget(s)");

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

/// A widget's rectangle and the appearance to paint there
struct Widget {
    rect: [f32; 4],
    appearance: Option<ObjectId>,
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn rect_of(dict: &Dictionary, key: &[u8]) -> Option<[f32; 4]> {
    let values: Vec<f32> = dict
        .get(key)
        .ok()?
        .as_array()
        .ok()?
        .iter()
        .filter_map(number)
        .collect();
    let [x1, y1, x2, y2] = values.as_slice() else {
        return None;
    };
    Some([x1.min(*x2), y1.min(*y2), x1.max(*x2), y1.max(*y2)])
}

/// Follow a reference, or take a direct object as is
fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn widget(doc: &Document, annotation: &Object) -> Option<Widget> {
    let dict = resolve(doc, annotation)?.as_dict().ok()?;
    if dict.get(b"Subtype").and_then(Object::as_name).ok()? != b"Widget" {
        return None;
    }
    let rect = rect_of(dict, b"Rect")?;

    let normal = dict
        .get(b"AP")
        .ok()
        .and_then(|ap| resolve(doc, ap))
        .and_then(|ap| ap.as_dict().ok())
        .and_then(|ap| ap.get(b"N").ok());
    let appearance = match normal {
        Some(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Stream(_)) => Some(*id),
            // an appearance per state, picked by the widget's current state
            Ok(Object::Dictionary(states)) => current_state(dict, states),
            _ => None,
        },
        Some(Object::Dictionary(states)) => current_state(dict, states),
        _ => None,
    };

    Some(Widget { rect, appearance })
}

fn current_state(widget: &Dictionary, states: &Dictionary) -> Option<ObjectId> {
    let state = widget.get(b"AS").and_then(Object::as_name).ok()?;
    states.get(state).and_then(Object::as_reference).ok()
}

/// Returns how many widgets were removed from the page
fn flatten_page(doc: &mut Document, page: ObjectId) -> Result<usize, ProtectionError> {
    let annotations: Vec<Object> = match doc.get_dictionary(page)?.get(b"Annots") {
        Ok(annots) => match resolve(doc, annots).map(Object::as_array) {
            Some(Ok(array)) => array.clone(),
            _ => Vec::new(),
        },
        Err(_) => return Ok(0),
    };

    let mut kept = Vec::new();
    let mut widgets = Vec::new();
    for annotation in annotations {
        match widget(doc, &annotation) {
            Some(widget) => widgets.push(widget),
            None => kept.push(annotation),
        }
    }
    if widgets.is_empty() {
        return Ok(0);
    }

    let mut resources = inherited_resources(doc, page);
    let mut xobjects = resources
        .get(b"XObject")
        .ok()
        .and_then(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .cloned()
        .unwrap_or_default();
    let mut ops = String::from("Q\n");
    for (i, widget) in widgets.iter().enumerate() {
        let Some(appearance) = widget.appearance else {
            continue;
        };
        let bbox = doc
            .get_object(appearance)
            .and_then(Object::as_stream)
            .ok()
            .and_then(|s| rect_of(&s.dict, b"BBox"))
            .unwrap_or([0.0; 4]);
        let name = format!("Flat{i}");
        xobjects.set(name.as_bytes().to_vec(), Object::Reference(appearance));
        ops.push_str(&format!(
            "q 1 0 0 1 {} {} cm /{name} Do Q\n",
            widget.rect[0] - bbox[0],
            widget.rect[1] - bbox[1],
        ));
    }

    resources.set("XObject", Object::Dictionary(xobjects));

    let save = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let paint = doc.add_object(Stream::new(Dictionary::new(), ops.into_bytes()));

    let page_dict = doc.get_object_mut(page)?.as_dict_mut()?;
    let mut contents = vec![Object::Reference(save)];
    match page_dict.get(b"Contents") {
        Ok(Object::Array(existing)) => contents.extend(existing.iter().cloned()),
        Ok(existing @ Object::Reference(_)) => contents.push(existing.clone()),
        _ => {}
    }
    contents.push(Object::Reference(paint));
    page_dict.set("Contents", Object::Array(contents));
    page_dict.set("Resources", Object::Dictionary(resources));
    if kept.is_empty() {
        page_dict.remove(b"Annots");
    } else {
        page_dict.set("Annots", Object::Array(kept));
    }

    Ok(widgets.len())
}

/// A copy of the resources in effect for `page`: its own, or the nearest
/// ancestor's in the page tree. Empty if there are none.
fn inherited_resources(doc: &Document, page: ObjectId) -> Dictionary {
    let mut node = page;
    let mut visited = Vec::new();
    while !visited.contains(&node) {
        visited.push(node);
        let Ok(dict) = doc.get_dictionary(node) else {
            break;
        };
        if let Some(resources) = dict
            .get(b"Resources")
            .ok()
            .and_then(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok())
        {
            return resources.clone();
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => node = parent,
            Err(_) => break,
        }
    }
    Dictionary::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn ints(values: &[i64]) -> Object {
        Object::Array(values.iter().map(|v| Object::Integer(*v)).collect())
    }

    fn form_pdf() -> Vec<u8> {
        form_pdf_with(None)
    }

    /// A one-page form; `inherited` becomes the `/Resources` of the page tree root
    fn form_pdf_with(inherited: Option<Dictionary>) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages = doc.new_object_id();
        let appearance = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => ints(&[0, 0, 100, 20]),
            },
            b"0 0 1 rg 0 0 100 20 re f".to_vec(),
        ));
        let widget = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Tx",
            "T" => Object::string_literal("name"),
            "Rect" => ints(&[50, 700, 150, 720]),
            "AP" => dictionary! { "N" => appearance },
        });
        let link = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => ints(&[50, 600, 150, 620]),
        });
        let content = doc.add_object(Stream::new(Dictionary::new(), b"0 g".to_vec()));
        let page = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages,
            "MediaBox" => ints(&[0, 0, 595, 842]),
            "Contents" => content,
            "Annots" => vec![Object::Reference(widget), Object::Reference(link)],
        });
        let mut tree = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page)],
            "Count" => Object::Integer(1),
        };
        if let Some(resources) = inherited {
            tree.set("Resources", Object::Dictionary(resources));
        }
        doc.objects.insert(pages, Object::Dictionary(tree));
        let catalog = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages,
            "AcroForm" => dictionary! { "Fields" => vec![Object::Reference(widget)] },
        });
        doc.trailer.set("Root", catalog);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn widgets_become_page_content() {
        let flat = flatten(&form_pdf()).unwrap();
        let doc = Document::load_mem(&flat).unwrap();

        let root = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
        assert!(!doc.get_dictionary(root).unwrap().has(b"AcroForm"));

        let page = *doc.get_pages().values().next().unwrap();
        let page = doc.get_dictionary(page).unwrap();
        let annots = page.get(b"Annots").unwrap().as_array().unwrap();
        assert_eq!(annots.len(), 1, "only the link survives");

        let xobjects = page
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"XObject")
            .unwrap()
            .as_dict()
            .unwrap();
        assert!(xobjects.has(b"Flat0"));
        assert_eq!(page.get(b"Contents").unwrap().as_array().unwrap().len(), 3);
    }

    #[test]
    fn inherited_resources_survive_flattening() {
        let font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        };
        let inherited = dictionary! {
            "Font" => dictionary! { "F1" => font },
        };
        let flat = flatten(&form_pdf_with(Some(inherited))).unwrap();
        let doc = Document::load_mem(&flat).unwrap();

        let page = *doc.get_pages().values().next().unwrap();
        let resources = doc
            .get_dictionary(page)
            .unwrap()
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(b"F1"));
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        assert!(xobjects.has(b"Flat0"));
    }

    #[test]
    fn flattening_is_idempotent() {
        let once = flatten(&form_pdf()).unwrap();
        let twice = flatten(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn documents_without_forms_pass_through() {
        let mut doc = crate::Document::default();
        doc.add_page(crate::Page::new(crate::pagesize::A4, None));
        let bytes = doc.to_bytes().unwrap();
        assert_eq!(flatten(&bytes).unwrap(), bytes);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            flatten(b"not a pdf"),
            Err(ProtectionError::Document(_))
        ));
    }
}
