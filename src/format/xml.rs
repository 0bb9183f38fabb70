//! Legacy XML payload reader (format 1).
//!
//! The document is read defensively. Missing or unparseable fields keep
//! their model defaults, and a function element without a numeric
//! `<function>` child is skipped. A document that is not well-formed is not
//! an error: the raw payload is returned as a single unknown block.
//!
//! ```text
//! <z21>
//!   <exportmeta><version>1</version></exportmeta>
//!   <locos>
//!     <loco>
//!       <address>3</address> <name>BR 218</name>
//!       <max_speed>120</max_speed> <traction_direction>1</traction_direction>
//!       <functions>
//!         <function_element>
//!           <function>0</function> <image_name>light</image_name>
//!           <shortcut>L</shortcut> <position>0</position> <time>0</time>
//!           <button_type>0</button_type> <active>1</active>
//!         </function_element>
//!       </functions>
//!     </loco>
//!   </locos>
//! </z21>
//! ```

use std::str::FromStr;

use roxmltree as xml;

use super::reader::decode_dropping_invalid;
use crate::model::{
    ButtonKind, FallbackReason, FunctionInfo, Locomotive, NO_DURATION, ParseOutcome,
    ParsedConfiguration, validate_number,
};

/// Parses an XML payload.
///
/// Invalid UTF-8 sequences are dropped before parsing. On a malformed
/// document the returned fallback holds the original `bytes` unchanged.
pub fn parse(bytes: &[u8]) -> ParseOutcome {
    let text = decode_dropping_invalid(bytes);
    let options = xml::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    match xml::Document::parse_with_options(&text, options) {
        Ok(doc) => ParseOutcome::Parsed(read_document(&doc.root_element())),
        Err(e) => {
            log::warn!("XML payload is not well-formed, keeping it as raw data: {}", e);
            ParseOutcome::fallback(bytes.to_vec(), FallbackReason::MalformedXml(e.to_string()))
        }
    }
}

fn read_document(root: &xml::Node<'_, '_>) -> ParsedConfiguration {
    let mut config = ParsedConfiguration::new();

    if let Some(version) = child(root, "exportmeta").and_then(|meta| number(&meta, "version")) {
        config.version = version;
    }

    if let Some(locos) = child(root, "locos") {
        for loco in locos.children().filter(|c| c.has_tag_name("loco")) {
            config.locomotives.push(read_locomotive(&loco));
        }
    }

    log::debug!("read {} locomotives from XML payload", config.locomotives.len());
    config
}

fn read_locomotive(node: &xml::Node<'_, '_>) -> Locomotive {
    let mut loco = Locomotive::default();

    if let Some(address) = number(node, "address") {
        loco.address = address;
    }
    if let Some(name) = text(node, "name") {
        loco.name = name.to_string();
    }
    if let Some(speed) = number(node, "max_speed") {
        loco.speed = speed;
    }
    if let Some(code) = number::<i64>(node, "traction_direction") {
        loco.direction = code == 1;
    }

    if let Some(functions) = child(node, "functions") {
        for element in functions
            .children()
            .filter(|c| c.has_tag_name("function_element"))
        {
            if let Some(info) = read_function(&element) {
                if let Err(e) = loco.insert_function(info) {
                    log::warn!("skipping XML function element: {}", e);
                }
            }
        }
    }

    loco
}

fn read_function(node: &xml::Node<'_, '_>) -> Option<FunctionInfo> {
    let raw = number::<i64>(node, "function")?;
    let Some(slot) = u32::try_from(raw).ok().and_then(|n| validate_number(n).ok()) else {
        log::warn!("skipping XML function element with out-of-range number {}", raw);
        return None;
    };

    let mut info = FunctionInfo::unchecked(slot);
    if let Some(active) = number::<i64>(node, "active") {
        info.active = active == 1;
    }
    if let Some(image) = text(node, "image_name") {
        info.image_name = image.to_string();
    }
    if let Some(shortcut) = text(node, "shortcut") {
        info.shortcut = shortcut.to_string();
    }
    if let Some(position) = number(node, "position") {
        info.position = position;
    }
    info.duration = text(node, "time").unwrap_or(NO_DURATION).to_string();
    if let Some(code) = number(node, "button_type") {
        info.button = ButtonKind::from_code(code);
    }
    Some(info)
}

fn child<'a, 'input>(node: &xml::Node<'a, 'input>, tag: &str) -> Option<xml::Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name(tag))
}

/// Non-empty text of the first child named `tag`.
fn text<'a>(node: &xml::Node<'a, '_>, tag: &str) -> Option<&'a str> {
    child(node, tag)
        .and_then(|c| c.text())
        .filter(|t| !t.is_empty())
}

fn number<T: FromStr>(node: &xml::Node<'_, '_>, tag: &str) -> Option<T> {
    text(node, tag).and_then(|t| t.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<z21>
  <exportmeta><version>1</version></exportmeta>
  <locos>
    <loco>
      <address>3</address>
      <name>BR 218</name>
      <max_speed>120</max_speed>
      <traction_direction>1</traction_direction>
      <functions>
        <function_element>
          <function>0</function>
          <image_name>light</image_name>
          <shortcut>L</shortcut>
          <position>0</position>
          <button_type>0</button_type>
        </function_element>
        <function_element>
          <function>2</function>
          <image_name>horn</image_name>
          <position>1</position>
          <time>2.5</time>
          <button_type>2</button_type>
          <active>0</active>
        </function_element>
        <function_element>
          <image_name>orphan</image_name>
        </function_element>
      </functions>
    </loco>
    <loco>
      <address>44</address>
      <name></name>
      <traction_direction>0</traction_direction>
    </loco>
  </locos>
</z21>"#;

    fn parsed(input: &str) -> ParsedConfiguration {
        match parse(input.as_bytes()) {
            ParseOutcome::Parsed(config) => config,
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_reads_locomotives() {
        let config = parsed(SAMPLE);
        assert_eq!(config.version, 1);
        assert_eq!(config.locomotives.len(), 2);

        let first = &config.locomotives[0];
        assert_eq!(first.address, 3);
        assert_eq!(first.name, "BR 218");
        assert_eq!(first.speed, 120);
        assert!(first.direction);
        assert!(first.vehicle_id.is_none());

        let second = &config.locomotives[1];
        assert_eq!(second.address, 44);
        assert_eq!(second.name, "");
        assert_eq!(second.speed, 0);
        assert!(!second.direction);
    }

    #[test]
    fn test_reads_functions() {
        let config = parsed(SAMPLE);
        let loco = &config.locomotives[0];
        assert_eq!(loco.function_count(), 2);

        let light = loco.function(0).unwrap();
        assert_eq!(light.image_name, "light");
        assert_eq!(light.shortcut, "L");
        assert_eq!(light.duration, "0");
        assert_eq!(light.button, ButtonKind::Momentary);
        assert!(light.active);

        let horn = loco.function(2).unwrap();
        assert_eq!(horn.position, 1);
        assert_eq!(horn.duration, "2.5");
        assert_eq!(horn.button, ButtonKind::Timed);
        assert!(!horn.active);

        assert_eq!(loco.functions().get(&2), Some(&false));
    }

    #[test]
    fn test_missing_sections() {
        let config = parsed("<z21/>");
        assert_eq!(config.version, 0);
        assert!(config.locomotives.is_empty());
    }

    #[test]
    fn test_direction_defaults_forward() {
        let config = parsed("<z21><locos><loco><address>5</address></loco></locos></z21>");
        assert!(config.locomotives[0].direction);
    }

    #[test]
    fn test_unparseable_numbers_keep_defaults() {
        let config = parsed(
            "<z21><exportmeta><version>new</version></exportmeta>\
             <locos><loco><address>x</address><max_speed> 80 </max_speed></loco></locos></z21>",
        );
        assert_eq!(config.version, 0);
        assert_eq!(config.locomotives[0].address, 0);
        assert_eq!(config.locomotives[0].speed, 80);
    }

    #[test]
    fn test_function_number_out_of_range_skipped() {
        let config = parsed(
            "<z21><locos><loco><functions>\
             <function_element><function>300</function></function_element>\
             <function_element><function>-1</function></function_element>\
             <function_element><function>200</function></function_element>\
             <function_element><function>128</function></function_element>\
             <function_element><function>127</function></function_element>\
             <function_element><function>4</function></function_element>\
             </functions></loco></locos></z21>",
        );
        let numbers: Vec<_> = config.locomotives[0].functions().into_keys().collect();
        assert_eq!(numbers, vec![4, 127]);
    }

    #[test]
    fn test_doctype_is_accepted() {
        let config = parsed(
            "<?xml version=\"1.0\"?><!DOCTYPE z21>\
             <z21><locos><loco><address>3</address></loco></locos></z21>",
        );
        assert_eq!(config.locomotives.len(), 1);
        assert_eq!(config.locomotives[0].address, 3);
    }

    #[test]
    fn test_malformed_document_falls_back() {
        let input = b"<z21><locos><loco></locos>";
        let outcome = parse(input);
        assert!(matches!(
            outcome.fallback_reason(),
            Some(FallbackReason::MalformedXml(_))
        ));
        let config = outcome.config();
        assert!(config.locomotives.is_empty());
        assert_eq!(config.unknown_blocks.len(), 1);
        assert_eq!(config.unknown_blocks[0].offset, 0);
        assert_eq!(config.unknown_blocks[0].length, input.len() as u64);
        assert_eq!(config.unknown_blocks[0].data, input.to_vec());
    }

    #[test]
    fn test_invalid_utf8_dropped() {
        let mut input = b"<z21><locos><loco><name>Lok".to_vec();
        input.push(0xFF);
        input.extend_from_slice(b"1</name></loco></locos></z21>");

        let outcome = parse(&input);
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.config().locomotives[0].name, "Lok1");
    }
}
