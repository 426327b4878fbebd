//! KiCad XML netlist part lists
//!
//! Only `<components>/<comp>` elements are read:
//!
//! ```xml
//! <comp ref="R1">
//!   <value>10k</value>
//!   <fields><field name="Tolerance">1%</field></fields>
//!   <libsource lib="Device" part="R" description="Resistor"/>
//! </comp>
//! ```

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::normalize::{fields, RawEntry};

/// Read a netlist; each placed component becomes one record
///
/// `<field>` children are kept only when their name is listed in
/// `custom_fields`. A component without a quantity field counts once.
pub fn read_netlist<R: BufRead>(
    reader: R,
    custom_fields: &[String],
) -> Result<Vec<RawEntry>, quick_xml::Error> {
    let mut reader = Reader::from_reader(reader);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<RawEntry> = None;
    let mut text_target: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"comp" => current = Some(start_component(e)?),
                b"value" if current.is_some() => text_target = Some("Value".to_string()),
                b"field" if current.is_some() => {
                    text_target = attribute(e, b"name")?
                        .filter(|name| custom_fields.iter().any(|f| f == name));
                }
                b"libsource" => {
                    if let Some(entry) = current.as_mut() {
                        read_libsource(e, entry)?;
                    }
                }
                _ => {}
            },
            Event::Empty(ref e) => match e.name().as_ref() {
                b"comp" => entries.push(finish_component(start_component(e)?)),
                b"libsource" => {
                    if let Some(entry) = current.as_mut() {
                        read_libsource(e, entry)?;
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if let (Some(entry), Some(target)) = (current.as_mut(), text_target.as_ref()) {
                    entry.insert(target.clone(), t.unescape()?.trim());
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"comp" => {
                    if let Some(entry) = current.take() {
                        entries.push(finish_component(entry));
                    }
                    text_target = None;
                }
                b"value" | b"field" => text_target = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

fn start_component(e: &BytesStart<'_>) -> Result<RawEntry, quick_xml::Error> {
    let mut entry = RawEntry::new();
    if let Some(reference) = attribute(e, b"ref")? {
        entry.insert("Ref", reference.trim());
    }
    Ok(entry)
}

fn finish_component(mut entry: RawEntry) -> RawEntry {
    if entry.value_of(fields::QUANTITY).is_none() {
        entry.insert("Quantity", "1");
    }
    entry
}

fn read_libsource(e: &BytesStart<'_>, entry: &mut RawEntry) -> Result<(), quick_xml::Error> {
    for (attr, field) in [
        (&b"lib"[..], "Library"),
        (&b"part"[..], "Part"),
        (&b"description"[..], "Description"),
    ] {
        if let Some(value) = attribute(e, attr)? {
            entry.insert(field, value.trim());
        }
    }
    Ok(())
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, quick_xml::Error> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<export version="D">
  <design><source>synth.sch</source></design>
  <components>
    <comp ref="R1">
      <value>10K</value>
      <footprint>Resistor_THT:R_Axial</footprint>
      <fields>
        <field name="Tolerance">1%</field>
        <field name="Supplier">ignored</field>
      </fields>
      <libsource lib="Device" part="R" description="Resistor"/>
      <sheetpath names="/" tstamps="/"/>
    </comp>
    <comp ref="C1">
      <value>100nF</value>
      <fields>
        <field name="Quantity">4</field>
      </fields>
      <libsource lib="Device" part="C" description="Unpolarized capacitor"/>
    </comp>
    <comp ref="J1">
      <value>Thonkiconn</value>
      <libsource lib="synth" part="Thonkiconn Mono Jack" description="3.5mm &amp; mono"/>
    </comp>
  </components>
  <libparts>
    <libpart lib="Device" part="R">
      <fields><field name="Tolerance">5%</field></fields>
    </libpart>
  </libparts>
</export>
"#;

    fn custom_fields() -> Vec<String> {
        vec!["Tolerance".to_string(), "Quantity".to_string()]
    }

    #[test]
    fn test_reads_components() {
        let entries = read_netlist(NETLIST.as_bytes(), &custom_fields()).unwrap();
        assert_eq!(entries.len(), 3);

        let r1 = &entries[0];
        assert_eq!(r1.get("Ref"), Some("R1"));
        assert_eq!(r1.get("Value"), Some("10K"));
        assert_eq!(r1.get("Library"), Some("Device"));
        assert_eq!(r1.get("Part"), Some("R"));
        assert_eq!(r1.get("Description"), Some("Resistor"));
        assert_eq!(r1.get("Tolerance"), Some("1%"));
        assert_eq!(r1.get("Quantity"), Some("1"));
        assert!(!r1.contains("Supplier"));
    }

    #[test]
    fn test_quantity_field_is_kept() {
        let entries = read_netlist(NETLIST.as_bytes(), &custom_fields()).unwrap();
        assert_eq!(entries[1].get("Quantity"), Some("4"));
    }

    #[test]
    fn test_attributes_are_unescaped() {
        let entries = read_netlist(NETLIST.as_bytes(), &custom_fields()).unwrap();
        assert_eq!(entries[2].get("Part"), Some("Thonkiconn Mono Jack"));
        assert_eq!(entries[2].get("Description"), Some("3.5mm & mono"));
    }

    #[test]
    fn test_libparts_are_ignored() {
        let entries = read_netlist(NETLIST.as_bytes(), &custom_fields()).unwrap();
        assert!(entries.iter().all(|e| e.get("Tolerance") != Some("5%")));
    }

    #[test]
    fn test_empty_component_element() {
        let xml = r#"<export><components><comp ref="TP1"/></components></export>"#;
        let entries = read_netlist(xml.as_bytes(), &custom_fields()).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].get("Ref"), Some("TP1"));
        assert_eq!(entries[0].get("Quantity"), Some("1"));
        assert_eq!(entries[0].get("Part"), None);
    }

    #[test]
    fn test_mismatched_tags_are_an_error() {
        let xml = r#"<export><components><comp ref="R1"></export>"#;
        assert!(read_netlist(xml.as_bytes(), &custom_fields()).is_err());
    }
}
