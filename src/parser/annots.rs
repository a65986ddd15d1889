//! Page annotation reading.

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::{quads_to_rects, Annotation, AnnotationKind, Rect};

use super::layout::{decode_text_simple, get_number, resolve};

/// Read the annotations of a page in `/Annots` order.
///
/// Geometry is converted to a top-left origin using `page_height`.
/// Entries that are not dictionaries, lack a `/Subtype` name, or lack a
/// usable `/Rect` are skipped.
pub fn extract_page_annotations(
    doc: &LopdfDocument,
    page_id: ObjectId,
    page_height: f32,
) -> Result<Vec<Annotation>> {
    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::PdfParse(format!("failed to get page dictionary: {e}")))?;

    let annots_obj = match page_dict.get(b"Annots") {
        Ok(obj) => resolve(doc, obj),
        Err(_) => return Ok(Vec::new()),
    };
    let annots_array = match annots_obj.and_then(|o| o.as_array().ok()) {
        Some(arr) => arr,
        None => {
            log::debug!("/Annots on page object {:?} is not an array", page_id);
            return Ok(Vec::new());
        }
    };

    let mut annotations = Vec::new();
    for entry in annots_array {
        let Some(dict) = resolve(doc, entry).and_then(|o| o.as_dict().ok()) else {
            continue;
        };
        if let Some(annotation) = read_annotation(doc, dict, page_height) {
            annotations.push(annotation);
        }
    }
    Ok(annotations)
}

fn read_annotation(doc: &LopdfDocument, dict: &Dictionary, page_height: f32) -> Option<Annotation> {
    let subtype = match dict.get(b"Subtype").ok()? {
        Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
        _ => return None,
    };
    let kind = AnnotationKind::from_subtype(&subtype);

    let rect_values = number_array(doc, dict, b"Rect")?;
    let [x0, y0, x1, y1] = rect_values[..] else {
        return None;
    };
    let rect = Rect::new(x0, y0, x1, y1).flip_vertical(page_height);

    let quads = if kind.is_text_markup() {
        number_array(doc, dict, b"QuadPoints")
            .map(|points| {
                quads_to_rects(&points)
                    .into_iter()
                    .map(|q| q.flip_vertical(page_height))
                    .collect()
            })
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    let mut annotation = Annotation::new(kind, rect).with_quads(quads);
    let contents = dict.get(b"Contents").ok().and_then(|o| resolve(doc, o));
    if let Some(Object::String(bytes, _)) = contents {
        annotation = annotation.with_contents(decode_text_simple(bytes));
    }
    Some(annotation)
}

/// Read an array of numbers, following one level of indirection.
fn number_array(doc: &LopdfDocument, dict: &Dictionary, key: &[u8]) -> Option<Vec<f32>> {
    let arr = resolve(doc, dict.get(key).ok()?)?.as_array().ok()?;
    arr.iter()
        .map(|o| resolve(doc, o).and_then(get_number))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn page_with_annots(annots: Vec<Object>) -> (LopdfDocument, ObjectId) {
        let mut doc = LopdfDocument::with_version("1.5");
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Annots" => annots,
        });
        (doc, page_id)
    }

    #[test]
    fn test_highlight_with_quad_points() {
        let annot = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Highlight",
            "Rect" => vec![70.into(), 690.into(), 200.into(), 712.into()],
            "QuadPoints" => vec![
                72.into(), 710.into(), 198.into(), 710.into(),
                72.into(), 698.into(), 198.into(), 698.into(),
            ],
            "Contents" => Object::string_literal("check"),
        };
        let (doc, page_id) = page_with_annots(vec![Object::Dictionary(annot)]);

        let annots = extract_page_annotations(&doc, page_id, 792.0).unwrap();
        assert_eq!(annots.len(), 1);
        assert!(annots[0].is_highlight());
        assert_eq!(annots[0].quads, vec![Rect::new(72.0, 82.0, 198.0, 94.0)]);
        assert_eq!(annots[0].rect, Rect::new(70.0, 80.0, 200.0, 102.0));
        assert_eq!(annots[0].contents.as_deref(), Some("check"));
    }

    #[test]
    fn test_skips_entries_without_subtype() {
        let good = dictionary! {
            "Subtype" => "Link",
            "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
        };
        let bad = dictionary! {
            "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
        };
        let (doc, page_id) =
            page_with_annots(vec![Object::Dictionary(bad), Object::Dictionary(good)]);

        let annots = extract_page_annotations(&doc, page_id, 792.0).unwrap();
        assert_eq!(annots.len(), 1);
        assert_eq!(annots[0].kind, AnnotationKind::Link);
        assert!(annots[0].quads.is_empty());
    }

    #[test]
    fn test_page_without_annots() {
        let mut doc = LopdfDocument::with_version("1.5");
        let page_id = doc.add_object(dictionary! { "Type" => "Page" });
        assert!(extract_page_annotations(&doc, page_id, 792.0)
            .unwrap()
            .is_empty());
    }
}
