//! OAI-PMH response parsing with quick-xml
//!
//! Both metadata formats are mapped onto one [`OaiMetadata`] shape:
//! `oai_dc` fields map directly, `arXiv` fields are folded in (authors →
//! creators, categories → subjects, abstract → descriptions, created /
//! updated → dates, id → identifiers).

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;

/// Supported `metadataPrefix` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataPrefix {
    /// Dublin Core
    #[default]
    OaiDc,
    /// arXiv's native format
    Arxiv,
}

impl MetadataPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OaiDc => "oai_dc",
            Self::Arxiv => "arXiv",
        }
    }
}

impl FromStr for MetadataPrefix {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "oai_dc" => Ok(Self::OaiDc),
            "arXiv" => Ok(Self::Arxiv),
            other => Err(format!(
                "unsupported metadata prefix {other:?} (expected \"oai_dc\" or \"arXiv\")"
            )),
        }
    }
}

impl fmt::Display for MetadataPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One harvested record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OaiMetadata {
    pub oai_identifier: Option<String>,
    pub oai_specs: Vec<String>,
    pub oai_datestamp: Option<NaiveDate>,
    /// Header marked `status="deleted"`; such records carry no metadata
    pub deleted: bool,
    pub title: Option<String>,
    pub creators: Vec<String>,
    pub subjects: Vec<String>,
    pub descriptions: Vec<String>,
    pub dates: Vec<String>,
    pub identifiers: Vec<String>,
}

/// One page of a `ListRecords` response.
#[derive(Debug, Default)]
pub struct ListPage {
    pub records: Vec<OaiMetadata>,
    /// Present and non-empty when more pages follow
    pub resumption_token: Option<String>,
    pub complete_list_size: Option<u64>,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Other,
    Header,
    Metadata,
}

/// Collapse runs of whitespace (titles and names are often wrapped).
fn squash(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl OaiMetadata {
    fn assign(&mut self, section: Section, tag: &[u8], value: &str, author: &mut Author) {
        if value.is_empty() {
            return;
        }
        match (section, tag) {
            (Section::Header, b"identifier") => self.oai_identifier = Some(value.to_string()),
            (Section::Header, b"setSpec") => self.oai_specs.push(value.to_string()),
            (Section::Header, b"datestamp") => {
                self.oai_datestamp = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok();
            }
            (Section::Metadata, b"title") if self.title.is_none() => {
                self.title = Some(squash(value));
            }
            (Section::Metadata, b"creator") => self.creators.push(squash(value)),
            (Section::Metadata, b"subject") => self.subjects.push(value.to_string()),
            (Section::Metadata, b"categories") => {
                self.subjects
                    .extend(value.split_whitespace().map(str::to_string));
            }
            (Section::Metadata, b"description" | b"abstract") => {
                self.descriptions.push(value.to_string());
            }
            (Section::Metadata, b"date" | b"created" | b"updated") => {
                self.dates.push(value.to_string());
            }
            (Section::Metadata, b"identifier" | b"id") => self.identifiers.push(value.to_string()),
            (Section::Metadata, b"keyname") => author.keyname = squash(value),
            (Section::Metadata, b"forenames") => author.forenames = squash(value),
            _ => {}
        }
    }
}

/// arXiv-format author being assembled.
#[derive(Default)]
struct Author {
    keyname: String,
    forenames: String,
}

impl Author {
    fn take_name(&mut self) -> Option<String> {
        let author = std::mem::take(self);
        match (author.forenames.is_empty(), author.keyname.is_empty()) {
            (_, true) => None,
            (true, false) => Some(author.keyname),
            (false, false) => Some(format!("{} {}", author.forenames, author.keyname)),
        }
    }
}

/// Parse a `<record>` body, leaving the reader after `</record>`.
fn parse_record(reader: &mut Reader<&[u8]>) -> Result<OaiMetadata> {
    let mut record = OaiMetadata::default();
    let mut section = Section::Other;
    let mut author = Author::default();
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                match e.local_name().as_ref() {
                    b"header" => {
                        section = Section::Header;
                        record.deleted = e
                            .try_get_attribute("status")?
                            .is_some_and(|a| a.value.as_ref() == b"deleted");
                    }
                    b"metadata" => section = Section::Metadata,
                    _ => {}
                }
                text.clear();
            }
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::End(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"record" => break,
                    b"header" | b"metadata" => section = Section::Other,
                    b"author" if section == Section::Metadata => {
                        if let Some(name) = author.take_name() {
                            record.creators.push(name);
                        }
                    }
                    tag => record.assign(section, tag, text.trim(), &mut author),
                }
                text.clear();
            }
            Event::Eof => bail!("unexpected end of document inside <record>"),
            _ => {}
        }
        buf.clear();
    }

    Ok(record)
}

/// Check for an OAI `<error code="...">` element. `noRecordsMatch` is
/// reported separately since it just means an empty result.
fn oai_error(code: &str, message: &str) -> Option<anyhow::Error> {
    (code != "noRecordsMatch").then(|| anyhow::anyhow!("OAI error {code}: {message}"))
}

/// Parse a `GetRecord` response.
pub fn parse_get_record(xml: &str) -> Result<OaiMetadata> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).context("XML parse error")? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"record" => return parse_record(&mut reader),
                b"error" => {
                    let code = error_code(&e)?;
                    let message = reader.read_text(e.name())?;
                    return Err(oai_error(&code, message.trim())
                        .unwrap_or_else(|| anyhow::anyhow!("OAI error {code}")));
                }
                _ => {}
            },
            Event::Eof => bail!("no <record> in GetRecord response"),
            _ => {}
        }
        buf.clear();
    }
}

/// Parse one `ListRecords` page.
pub fn parse_list_records(xml: &str) -> Result<ListPage> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut page = ListPage::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).context("XML parse error")? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"record" => page.records.push(parse_record(&mut reader)?),
                b"resumptionToken" => {
                    page.complete_list_size = list_size(&e)?;
                    let token = reader.read_text(e.name())?;
                    let token = token.trim();
                    if !token.is_empty() {
                        page.resumption_token = Some(token.to_string());
                    }
                }
                b"error" => {
                    let code = error_code(&e)?;
                    let message = reader.read_text(e.name())?;
                    if let Some(err) = oai_error(&code, message.trim()) {
                        return Err(err);
                    }
                }
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"resumptionToken" => {
                page.complete_list_size = list_size(&e)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(page)
}

fn error_code(e: &quick_xml::events::BytesStart<'_>) -> Result<String> {
    Ok(e.try_get_attribute("code")?
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
        .unwrap_or_default())
}

fn list_size(e: &quick_xml::events::BytesStart<'_>) -> Result<Option<u64>> {
    Ok(e.try_get_attribute("completeListSize")?
        .and_then(|a| std::str::from_utf8(&a.value).ok()?.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GET_RECORD_DC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
<responseDate>2024-01-01T00:00:00Z</responseDate>
<request verb="GetRecord" identifier="oai:arXiv.org:1605.00001" metadataPrefix="oai_dc">http://export.arxiv.org/oai2</request>
<GetRecord>
<record>
<header>
 <identifier>oai:arXiv.org:1605.00001</identifier>
 <datestamp>2016-05-03</datestamp>
 <setSpec>physics:astro-ph</setSpec>
 <setSpec>physics:gr-qc</setSpec>
</header>
<metadata>
 <oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/" xmlns:dc="http://purl.org/dc/elements/1.1/">
 <dc:title>Gravitational   waves
  from binaries</dc:title>
 <dc:creator>Doe, Jane</dc:creator>
 <dc:creator>Roe, Richard</dc:creator>
 <dc:subject>Astrophysics - Cosmology</dc:subject>
 <dc:description>We compute &amp; compare.</dc:description>
 <dc:date>2016-04-29</dc:date>
 <dc:type>text</dc:type>
 <dc:identifier>http://arxiv.org/abs/1605.00001</dc:identifier>
 </oai_dc:dc>
</metadata>
</record>
</GetRecord>
</OAI-PMH>"#;

    #[test]
    fn parses_dublin_core_record() {
        let r = parse_get_record(GET_RECORD_DC).unwrap();
        assert_eq!(r.oai_identifier.as_deref(), Some("oai:arXiv.org:1605.00001"));
        assert_eq!(r.oai_specs, vec!["physics:astro-ph", "physics:gr-qc"]);
        assert_eq!(r.oai_datestamp, NaiveDate::from_ymd_opt(2016, 5, 3));
        assert_eq!(r.title.as_deref(), Some("Gravitational waves from binaries"));
        assert_eq!(r.creators, vec!["Doe, Jane", "Roe, Richard"]);
        assert_eq!(r.subjects, vec!["Astrophysics - Cosmology"]);
        assert_eq!(r.descriptions, vec!["We compute & compare."]);
        assert_eq!(r.dates, vec!["2016-04-29"]);
        assert_eq!(r.identifiers, vec!["http://arxiv.org/abs/1605.00001"]);
        assert!(!r.deleted);
    }

    #[test]
    fn parses_arxiv_format_record() {
        let xml = r#"<OAI-PMH><GetRecord><record>
<header><identifier>oai:arXiv.org:2101.00001</identifier><datestamp>2021-01-05</datestamp><setSpec>cs</setSpec></header>
<metadata>
<arXiv xmlns="http://arxiv.org/OAI/arXiv/">
<id>2101.00001</id><created>2020-12-31</created><updated>2021-01-04</updated>
<authors>
  <author><keyname>Doe</keyname><forenames>Jane</forenames></author>
  <author><keyname>Collaboration</keyname></author>
</authors>
<title>A Title</title>
<categories>cs.LG stat.ML</categories>
<abstract>  Abstract text.  </abstract>
</arXiv>
</metadata>
</record></GetRecord></OAI-PMH>"#;
        let r = parse_get_record(xml).unwrap();
        assert_eq!(r.creators, vec!["Jane Doe", "Collaboration"]);
        assert_eq!(r.subjects, vec!["cs.LG", "stat.ML"]);
        assert_eq!(r.descriptions, vec!["Abstract text."]);
        assert_eq!(r.dates, vec!["2020-12-31", "2021-01-04"]);
        assert_eq!(r.identifiers, vec!["2101.00001"]);
        assert_eq!(r.title.as_deref(), Some("A Title"));
    }

    #[test]
    fn get_record_error_reported() {
        let xml = r#"<OAI-PMH><error code="idDoesNotExist">No matching identifier</error></OAI-PMH>"#;
        let err = parse_get_record(xml).unwrap_err();
        assert!(err.to_string().contains("idDoesNotExist"));
    }

    #[test]
    fn list_page_with_token() {
        let xml = r#"<OAI-PMH><ListRecords>
<record><header><identifier>oai:arXiv.org:a</identifier></header><metadata><dc><title>A</title></dc></metadata></record>
<record><header status="deleted"><identifier>oai:arXiv.org:b</identifier></header></record>
<resumptionToken cursor="0" completeListSize="2500">6960524|1001</resumptionToken>
</ListRecords></OAI-PMH>"#;
        let page = parse_list_records(xml).unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].title.as_deref(), Some("A"));
        assert!(page.records[1].deleted);
        assert_eq!(page.resumption_token.as_deref(), Some("6960524|1001"));
        assert_eq!(page.complete_list_size, Some(2500));
    }

    #[test]
    fn last_page_has_empty_token() {
        let xml = r#"<OAI-PMH><ListRecords>
<record><header><identifier>oai:arXiv.org:c</identifier></header></record>
<resumptionToken cursor="2000" completeListSize="2001"/>
</ListRecords></OAI-PMH>"#;
        let page = parse_list_records(xml).unwrap();
        assert_eq!(page.records.len(), 1);
        assert!(page.resumption_token.is_none());
        assert_eq!(page.complete_list_size, Some(2001));
    }

    #[test]
    fn no_records_match_is_empty() {
        let xml = r#"<OAI-PMH><error code="noRecordsMatch">nothing</error></OAI-PMH>"#;
        let page = parse_list_records(xml).unwrap();
        assert!(page.records.is_empty());
        assert!(page.resumption_token.is_none());
    }

    #[test]
    fn bad_argument_is_error() {
        let xml = r#"<OAI-PMH><error code="badArgument">Illegal date</error></OAI-PMH>"#;
        assert!(parse_list_records(xml).is_err());
    }

    #[test]
    fn prefix_parse() {
        assert_eq!("arXiv".parse::<MetadataPrefix>().unwrap(), MetadataPrefix::Arxiv);
        assert_eq!("oai_dc".parse::<MetadataPrefix>().unwrap(), MetadataPrefix::OaiDc);
        assert!("marc".parse::<MetadataPrefix>().is_err());
        assert_eq!(MetadataPrefix::default().as_str(), "oai_dc");
    }

    #[test]
    fn serializes_datestamp_as_iso_date() {
        let r = parse_get_record(GET_RECORD_DC).unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["oai_datestamp"], "2016-05-03");
        assert_eq!(json["creators"][1], "Roe, Richard");
    }
}
