//! Certificate and container fixtures for unit tests.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lopdf::{dictionary, Document, Object, Stream};
use rcgen::{
    date_time_ymd, BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
};

use crate::Certificate;

pub struct TestCert {
    pub cert: rcgen::Certificate,
    pub key: KeyPair,
}

impl TestCert {
    pub fn der(&self) -> &[u8] {
        self.cert.der().as_ref()
    }

    pub fn decoded(&self) -> Certificate {
        Certificate::from_der(self.der()).unwrap()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Validity {
    Current,
    Expired,
    NotYetValid,
}

pub fn params(name: &str, validity: Validity, ca: bool) -> CertificateParams {
    let mut params = CertificateParams::default();

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, name);
    dn.push(DnType::OrganizationName, "sigtrust tests");
    params.distinguished_name = dn;

    params.is_ca = if ca {
        IsCa::Ca(BasicConstraints::Unconstrained)
    } else {
        IsCa::NoCa
    };

    let (from, to) = match validity {
        Validity::Current => (date_time_ymd(2020, 1, 1), date_time_ymd(2100, 1, 1)),
        Validity::Expired => (date_time_ymd(2001, 1, 1), date_time_ymd(2002, 1, 1)),
        Validity::NotYetValid => (date_time_ymd(2090, 1, 1), date_time_ymd(2100, 1, 1)),
    };
    params.not_before = from;
    params.not_after = to;
    params
}

pub fn self_signed_root(name: &str) -> TestCert {
    let key = KeyPair::generate().unwrap();
    let cert = params(name, Validity::Current, true).self_signed(&key).unwrap();
    TestCert { cert, key }
}

pub fn issue(name: &str, issuer: &TestCert, validity: Validity, ca: bool) -> TestCert {
    issue_with(params(name, validity, ca), issuer)
}

/// Issue a certificate from hand-tuned parameters.
pub fn issue_with(params: CertificateParams, issuer: &TestCert) -> TestCert {
    let key = KeyPair::generate().unwrap();
    let cert = params.signed_by(&key, &issuer.cert, &issuer.key).unwrap();
    TestCert { cert, key }
}

/// A self-signed certificate reusing `issuer`'s key under a different name.
pub fn rekeyed_copy(name: &str, issuer: &TestCert) -> Certificate {
    let cert = params(name, Validity::Current, true)
        .self_signed(&issuer.key)
        .unwrap();
    Certificate::from_der(cert.der().as_ref()).unwrap()
}

/// Two CA certificates that name each other as issuer, neither self-signed.
pub fn cyclic_pair() -> (TestCert, TestCert) {
    let key_a = KeyPair::generate().unwrap();
    let key_b = KeyPair::generate().unwrap();

    let stub_b = params("Cycle B", Validity::Current, true)
        .self_signed(&key_b)
        .unwrap();
    let a = params("Cycle A", Validity::Current, true)
        .signed_by(&key_a, &stub_b, &key_b)
        .unwrap();
    let b = params("Cycle B", Validity::Current, true)
        .signed_by(&key_b, &a, &key_a)
        .unwrap();

    (
        TestCert { cert: a, key: key_a },
        TestCert { cert: b, key: key_b },
    )
}

/// Render a `SecuritySettings.xml` body holding the given certificates,
/// followed by `malformed` entries that are not valid Base64.
pub fn security_settings_xml(ders: &[&[u8]], malformed: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<SecuritySettings>\n");
    for der in ders {
        xml.push_str("  <TrustedIdentities><Identity>\n    <Certificate>");
        xml.push_str(&STANDARD.encode(der));
        xml.push_str("</Certificate>\n  </Identity></TrustedIdentities>\n");
    }
    for _ in 0..malformed {
        xml.push_str("  <Certificate>!!not*base64!!</Certificate>\n");
    }
    xml.push_str("</SecuritySettings>\n");
    xml
}

/// Build a PDF whose EmbeddedFiles name tree holds the given attachments.
pub fn pdf_with_attachments(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");

    let mut names = Vec::new();
    for (name, content) in files {
        let stream = doc.add_object(Stream::new(
            dictionary! { "Type" => "EmbeddedFile" },
            content.to_vec(),
        ));
        let filespec = doc.add_object(dictionary! {
            "Type" => "Filespec",
            "F" => Object::string_literal(*name),
            "EF" => dictionary! { "F" => stream },
        });
        names.push(Object::string_literal(*name));
        names.push(filespec.into());
    }

    let embedded = doc.add_object(dictionary! { "Names" => names });
    let name_dict = doc.add_object(dictionary! { "EmbeddedFiles" => embedded });
    let pages = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => 0,
    });
    let catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages,
        "Names" => name_dict,
    });
    doc.trailer.set("Root", catalog);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}
