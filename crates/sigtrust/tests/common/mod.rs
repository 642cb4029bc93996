//! Shared fixtures for integration tests.
#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lopdf::{dictionary, Document, Object, Stream};
use rcgen::{
    date_time_ymd, BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
};
use sigtrust::Certificate;

pub struct Issued {
    pub cert: rcgen::Certificate,
    pub key: KeyPair,
}

impl Issued {
    pub fn der(&self) -> &[u8] {
        self.cert.der().as_ref()
    }

    pub fn decoded(&self) -> Certificate {
        Certificate::from_der(self.der()).unwrap()
    }
}

fn params(name: &str, ca: bool, expired: bool) -> CertificateParams {
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, name);
    dn.push(DnType::OrganizationName, "Example Trust Services");
    dn.push(DnType::CountryName, "DE");
    params.distinguished_name = dn;
    params.is_ca = if ca {
        IsCa::Ca(BasicConstraints::Unconstrained)
    } else {
        IsCa::NoCa
    };
    if expired {
        params.not_before = date_time_ymd(2010, 1, 1);
        params.not_after = date_time_ymd(2012, 1, 1);
    } else {
        params.not_before = date_time_ymd(2020, 1, 1);
        params.not_after = date_time_ymd(2099, 12, 31);
    }
    params
}

pub fn root(name: &str) -> Issued {
    let key = KeyPair::generate().unwrap();
    let cert = params(name, true, false).self_signed(&key).unwrap();
    Issued { cert, key }
}

pub fn intermediate(name: &str, issuer: &Issued) -> Issued {
    let key = KeyPair::generate().unwrap();
    let cert = params(name, true, false)
        .signed_by(&key, &issuer.cert, &issuer.key)
        .unwrap();
    Issued { cert, key }
}

pub fn signer(name: &str, issuer: &Issued, expired: bool) -> Issued {
    let key = KeyPair::generate().unwrap();
    let cert = params(name, false, expired)
        .signed_by(&key, &issuer.cert, &issuer.key)
        .unwrap();
    Issued { cert, key }
}

pub fn trust_list_xml(ders: &[&[u8]], malformed: usize) -> String {
    let mut xml = String::from("<SecuritySettings><TrustedIdentities>");
    for der in ders {
        xml.push_str("<Identity><ImportAction>1</ImportAction><Certificate>\n");
        xml.push_str(&STANDARD.encode(der));
        xml.push_str("\n</Certificate></Identity>");
    }
    for i in 0..malformed {
        xml.push_str(&format!("<Identity><Certificate>broken-{i}%%</Certificate></Identity>"));
    }
    xml.push_str("</TrustedIdentities></SecuritySettings>");
    xml
}

/// Container PDF with the trust list stored Flate-compressed, the way
/// Acrobat security-settings files ship it.
pub fn trust_list_pdf(xml: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.6");

    let mut stream = Stream::new(dictionary! { "Type" => "EmbeddedFile" }, xml.as_bytes().to_vec());
    stream.compress().unwrap();
    let stream = doc.add_object(stream);
    let filespec = doc.add_object(dictionary! {
        "Type" => "Filespec",
        "F" => Object::string_literal("SecuritySettings.xml"),
        "UF" => Object::string_literal("SecuritySettings.xml"),
        "EF" => dictionary! { "F" => stream },
    });
    // Two-level name tree: root node with Kids, leaf with Names.
    let leaf = doc.add_object(dictionary! {
        "Names" => vec![Object::string_literal("SecuritySettings.xml"), filespec.into()],
        "Limits" => vec![
            Object::string_literal("SecuritySettings.xml"),
            Object::string_literal("SecuritySettings.xml"),
        ],
    });
    let embedded = doc.add_object(dictionary! { "Kids" => vec![Object::from(leaf)] });
    let names = doc.add_object(dictionary! { "EmbeddedFiles" => embedded });
    let pages = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => 0,
    });
    let catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages,
        "Names" => names,
    });
    doc.trailer.set("Root", catalog);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}
