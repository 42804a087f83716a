//! Data stages: json, xml, csv, serialize.
//!
//! Every format is parsed into a `serde_json::Value`, which `serialize`
//! prints back as `module.exports = <value>;`.

use bale_graph::LoadOutput;
use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Number, Value};

pub(super) fn parse_json(source: &str) -> Result<Value, String> {
    serde_json::from_str(source).map_err(|e| e.to_string())
}

pub(super) fn serialize(value: &Value) -> Result<LoadOutput, String> {
    let json = serde_json::to_string(value).map_err(|e| e.to_string())?;
    Ok(LoadOutput::code(format!("module.exports = {};\n", json)))
}

/// An element being read.
struct Element {
    name: String,
    attrs: Map<String, Value>,
    children: IndexMap<String, Vec<Value>>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self, String> {
        let mut attrs = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            attrs.insert(key, Value::String(value.into_owned()));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attrs,
            children: IndexMap::new(),
            text: String::new(),
        })
    }

    /// Text-only elements collapse to their text; everything else becomes an
    /// object with attributes under `$`, text under `_` and one array per
    /// child element name.
    fn close(self) -> (String, Value) {
        let text = if self.text.trim().is_empty() {
            None
        } else {
            Some(self.text)
        };

        if self.attrs.is_empty() && self.children.is_empty() {
            return (self.name, Value::String(text.unwrap_or_default()));
        }

        let mut object = Map::new();
        if !self.attrs.is_empty() {
            object.insert("$".to_string(), Value::Object(self.attrs));
        }
        if let Some(text) = text {
            object.insert("_".to_string(), Value::String(text));
        }
        for (name, values) in self.children {
            object.insert(name, Value::Array(values));
        }
        (self.name, Value::Object(object))
    }
}

/// Parse XML into `{ root: ... }` following the xml2js default shape.
pub(super) fn parse_xml(source: &str) -> Result<Value, String> {
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("{} at byte {}", e, reader.buffer_position()))?;
        match event {
            Event::Start(start) => stack.push(Element::open(&start)?),
            Event::Empty(start) => {
                let element = Element::open(&start)?;
                attach(&mut stack, &mut root, element.close())?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "closing tag without an open element".to_string())?;
                attach(&mut stack, &mut root, element.close())?;
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape().map_err(|e| e.to_string())?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }
    let (name, value) = root.ok_or_else(|| "document has no root element".to_string())?;
    let mut object = Map::new();
    object.insert(name, value);
    Ok(Value::Object(object))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<(String, Value)>,
    (name, value): (String, Value),
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.entry(name).or_default().push(value);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some((name, value));
            Ok(())
        }
        None => Err(format!("second root element <{}>", name)),
    }
}

/// Parse CSV into an array of row arrays.
///
/// Empty lines are skipped. Cells that look like numbers or booleans are
/// typed, empty cells become `null`.
pub(super) fn parse_csv(source: &str) -> Result<Value, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        rows.push(Value::Array(record.iter().map(typed_cell).collect()));
    }
    Ok(Value::Array(rows))
}

fn typed_cell(cell: &str) -> Value {
    match cell {
        "" => return Value::Null,
        "true" | "TRUE" => return Value::Bool(true),
        "false" | "FALSE" => return Value::Bool(false),
        _ => {}
    }
    numeric(cell)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(cell.to_string()))
}

fn numeric(cell: &str) -> Option<Number> {
    let trimmed = cell.trim();
    let unsigned = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let starts_ok = unsigned
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.');
    let chars_ok = unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !starts_ok || !chars_ok {
        return None;
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Number::from(int));
    }
    trimmed.parse::<f64>().ok().and_then(Number::from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_value_is_preserved() {
        let value = parse_json("{\"a\":1}").unwrap();
        assert_eq!(value, json!({"a": 1}));
        let out = serialize(&value).unwrap();
        assert_eq!(out.code, "module.exports = {\"a\":1};\n");
        assert!(out.imports.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(parse_json("{\"a\":").is_err());
    }

    #[test]
    fn test_xml_follows_xml2js_shape() {
        let value = parse_xml(
            "<?xml version=\"1.0\"?>\n<note priority=\"high\">\n  <to>Tove</to>\n  <to>Jani</to>\n  <body>Don't forget &amp; remember</body>\n  <empty/>\n</note>\n",
        )
        .unwrap();
        assert_eq!(
            value,
            json!({
                "note": {
                    "$": {"priority": "high"},
                    "to": ["Tove", "Jani"],
                    "body": ["Don't forget & remember"],
                    "empty": [""]
                }
            })
        );
    }

    #[test]
    fn test_xml_text_with_attributes() {
        let value = parse_xml("<a id=\"1\">hi</a>").unwrap();
        assert_eq!(value, json!({"a": {"$": {"id": "1"}, "_": "hi"}}));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(parse_xml("<a><b></a>").is_err());
        assert!(parse_xml("<a>").is_err());
        assert!(parse_xml("").is_err());
    }

    #[test]
    fn test_csv_rows_are_typed() {
        let value = parse_csv("name,age,admin\nAnna,31,true\n\nBob,,false\nEve,1.5e2,x\n").unwrap();
        assert_eq!(
            value,
            json!([
                ["name", "age", "admin"],
                ["Anna", 31, true],
                ["Bob", null, false],
                ["Eve", 150.0, "x"]
            ])
        );
    }

    #[test]
    fn test_numeric_detection() {
        assert_eq!(typed_cell("-2"), json!(-2));
        assert_eq!(typed_cell(".5"), json!(0.5));
        assert_eq!(typed_cell("1-2"), json!("1-2"));
        assert_eq!(typed_cell("inf"), json!("inf"));
        assert_eq!(typed_cell("12abc"), json!("12abc"));
    }
}
