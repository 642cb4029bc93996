//! Trust-list extraction from the container document.
//!
//! The upstream authority ships its root bundle as a file attachment inside
//! a PDF. Attachments live in the catalog's `Names` → `EmbeddedFiles` name
//! tree; each leaf pairs a name with a file specification whose `EF`
//! dictionary points at the embedded stream.

use lopdf::{Dictionary, Document, Object};
use tracing::debug;

use crate::error::{Result, TrustError};

/// Attachment that carries the trust list.
pub const TRUST_LIST_ATTACHMENT: &str = "SecuritySettings.xml";

/// Guard against cyclic `Kids` references in malformed name trees.
const MAX_NAME_TREE_DEPTH: usize = 32;

/// Extract the `SecuritySettings.xml` attachment from a container document.
pub fn extract_trust_list_xml(container: &[u8]) -> Result<Vec<u8>> {
    extract_attachment(container, TRUST_LIST_ATTACHMENT)
}

/// Extract the content of the attachment named exactly `name`.
///
/// The first attachment with that name in name-tree order wins.
pub fn extract_attachment(container: &[u8], name: &str) -> Result<Vec<u8>> {
    let doc = Document::load_mem(container).map_err(TrustError::container)?;

    for (entry_name, filespec) in embedded_files(&doc)? {
        debug!(attachment = %entry_name, "found embedded file");
        if entry_name == name {
            return embedded_file_content(&doc, filespec);
        }
    }

    Err(TrustError::TrustListNotFound {
        name: name.to_string(),
    })
}

/// List every attachment name in the container, in name-tree order.
pub fn list_attachments(container: &[u8]) -> Result<Vec<String>> {
    let doc = Document::load_mem(container).map_err(TrustError::container)?;
    Ok(embedded_files(&doc)?
        .into_iter()
        .map(|(name, _)| name)
        .collect())
}

/// Flatten the `EmbeddedFiles` name tree into `(name, filespec)` pairs.
///
/// A document without a `Names` dictionary or without `EmbeddedFiles`
/// simply has no attachments.
fn embedded_files(doc: &Document) -> Result<Vec<(String, &Object)>> {
    let catalog = doc.catalog().map_err(TrustError::container)?;

    let Some(names) = optional_dict(doc, catalog, b"Names")? else {
        return Ok(Vec::new());
    };
    let Some(root) = optional_dict(doc, names, b"EmbeddedFiles")? else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    walk_name_tree(doc, root, 0, &mut out)?;
    Ok(out)
}

fn walk_name_tree<'a>(
    doc: &'a Document,
    node: &'a Dictionary,
    depth: usize,
    out: &mut Vec<(String, &'a Object)>,
) -> Result<()> {
    if depth > MAX_NAME_TREE_DEPTH {
        return Err(TrustError::container("EmbeddedFiles name tree too deep"));
    }

    if let Ok(names) = node.get(b"Names") {
        let names = resolve(doc, names)?
            .as_array()
            .map_err(TrustError::container)?;
        for pair in names.chunks_exact(2) {
            let key = resolve(doc, &pair[0])?
                .as_str()
                .map_err(TrustError::container)?;
            out.push((decode_text_string(key), &pair[1]));
        }
    }

    if let Ok(kids) = node.get(b"Kids") {
        let kids = resolve(doc, kids)?
            .as_array()
            .map_err(TrustError::container)?;
        for kid in kids {
            let kid = resolve(doc, kid)?
                .as_dict()
                .map_err(TrustError::container)?;
            walk_name_tree(doc, kid, depth + 1, out)?;
        }
    }

    Ok(())
}

/// Read the embedded stream behind a file specification.
///
/// Prefers `EF/F`, falling back to the Unicode `EF/UF` entry.
fn embedded_file_content(doc: &Document, filespec: &Object) -> Result<Vec<u8>> {
    let filespec = resolve(doc, filespec)?
        .as_dict()
        .map_err(TrustError::container)?;
    let ef = resolve(doc, filespec.get(b"EF").map_err(TrustError::container)?)?
        .as_dict()
        .map_err(TrustError::container)?;
    let file = ef
        .get(b"F")
        .or_else(|_| ef.get(b"UF"))
        .map_err(TrustError::container)?;
    let stream = resolve(doc, file)?
        .as_stream()
        .map_err(TrustError::container)?;

    if stream.dict.has(b"Filter") {
        stream.decompressed_content().map_err(TrustError::container)
    } else {
        Ok(stream.content.clone())
    }
}

fn optional_dict<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Result<Option<&'a Dictionary>> {
    match dict.get(key) {
        Ok(obj) => resolve(doc, obj)?
            .as_dict()
            .map(Some)
            .map_err(TrustError::container),
        Err(_) => Ok(None),
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object> {
    doc.dereference(obj)
        .map(|(_, obj)| obj)
        .map_err(TrustError::container)
}

/// Decode a PDF text string: UTF-16BE when it carries a byte-order mark,
/// otherwise treated as single-byte (PDFDocEncoding overlaps Latin-1 for
/// the names that matter here).
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::pdf_with_attachments;

    #[test]
    fn extracts_the_security_settings_attachment() {
        let xml = b"<SecuritySettings></SecuritySettings>";
        let pdf = pdf_with_attachments(&[
            ("ReadMe.txt", b"hello"),
            (TRUST_LIST_ATTACHMENT, xml),
        ]);

        assert_eq!(extract_trust_list_xml(&pdf).unwrap(), xml);
    }

    #[test]
    fn missing_attachment_is_trust_list_not_found() {
        let pdf = pdf_with_attachments(&[("Other.xml", b"<x/>")]);

        let err = extract_trust_list_xml(&pdf).unwrap_err();
        assert!(matches!(err, TrustError::TrustListNotFound { ref name } if name == TRUST_LIST_ATTACHMENT));
    }

    #[test]
    fn name_match_is_exact() {
        let pdf = pdf_with_attachments(&[("securitysettings.xml", b"<x/>")]);
        assert!(matches!(
            extract_trust_list_xml(&pdf),
            Err(TrustError::TrustListNotFound { .. })
        ));
    }

    #[test]
    fn unparsable_container_is_container_parse_error() {
        let err = extract_trust_list_xml(b"this is not a pdf").unwrap_err();
        assert!(matches!(err, TrustError::ContainerParse { .. }));
    }

    #[test]
    fn lists_attachments_in_order() {
        let pdf = pdf_with_attachments(&[("a.txt", b"1"), ("b.txt", b"2")]);
        assert_eq!(list_attachments(&pdf).unwrap(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn utf16_names_are_decoded() {
        let mut raw = vec![0xFE, 0xFF];
        for unit in "Säkerhet.xml".encode_utf16() {
            raw.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_text_string(&raw), "Säkerhet.xml");
        assert_eq!(decode_text_string(b"plain.xml"), "plain.xml");
    }
}
