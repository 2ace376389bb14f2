//! Record set → JSON text.
//!
//! Records are rendered as plain JSON objects (the attribute-type tags are
//! dropped).  Numbers are written with the exact decimal text the store
//! returned, so `12.50` stays `12.50` and long decimals keep every digit.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::value::RawValue;
use tb_domain::error::Result;
use tb_domain::record::{is_json_number_literal, AttributeValue, Record};

/// Render every record as one JSON array.  No size cap is applied.
pub fn serialize(records: &[Record]) -> Result<String> {
    let rendered = records
        .iter()
        .map(render_record)
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("[{}]", rendered.join(",")))
}

/// Output of [`serialize_bounded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedContext {
    /// A valid JSON array holding the first `included` records.
    pub text: String,
    pub included: usize,
    pub total: usize,
}

impl SerializedContext {
    /// Records left out to respect the cap.
    pub fn omitted(&self) -> usize {
        self.total - self.included
    }

    pub fn is_complete(&self) -> bool {
        self.included == self.total
    }
}

/// Like [`serialize`], but stops adding records once the array would exceed
/// `max_chars` characters.
///
/// Records are kept in scan order; the cut is always between records, so the
/// text is a valid JSON array.  If not even the first record fits, the text
/// is `[]`.
pub fn serialize_bounded(records: &[Record], max_chars: usize) -> Result<SerializedContext> {
    let mut text = String::from("[");
    // Length of `text` in chars, excluding the closing bracket.
    let mut chars = 1;
    let mut included = 0;

    for record in records {
        let rendered = render_record(record)?;
        let separator = usize::from(included > 0);
        let needed = chars + separator + rendered.chars().count() + 1;
        if needed > max_chars {
            break;
        }
        if separator == 1 {
            text.push(',');
        }
        text.push_str(&rendered);
        chars = needed - 1;
        included += 1;
    }
    text.push(']');

    if included < records.len() {
        tracing::warn!(
            included,
            total = records.len(),
            max_chars,
            "context capped; trailing records omitted"
        );
    }

    Ok(SerializedContext {
        text,
        included,
        total: records.len(),
    })
}

fn render_record(record: &Record) -> Result<String> {
    Ok(serde_json::to_string(&PlainRecord(record))?)
}

// ── plain-JSON views over the typed record model ───────────────────

struct PlainRecord<'a>(&'a Record);

impl Serialize for PlainRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(name, &PlainValue(value))?;
        }
        map.end()
    }
}

struct PlainValue<'a>(&'a AttributeValue);

impl Serialize for PlainValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            AttributeValue::String(s) | AttributeValue::Binary(s) => serializer.serialize_str(s),
            AttributeValue::Number(n) => serialize_number(n, serializer),
            AttributeValue::Bool(b) => serializer.serialize_bool(*b),
            AttributeValue::Null(_) => serializer.serialize_unit(),
            AttributeValue::Map(m) => PlainRecord(m).serialize(serializer),
            AttributeValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&PlainValue(item))?;
                }
                seq.end()
            }
            AttributeValue::StringSet(items) | AttributeValue::BinarySet(items) => {
                items.serialize(serializer)
            }
            AttributeValue::NumberSet(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for n in items {
                    seq.serialize_element(&PlainNumber(n))?;
                }
                seq.end()
            }
        }
    }
}

struct PlainNumber<'a>(&'a str);

impl Serialize for PlainNumber<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_number(self.0, serializer)
    }
}

/// Emit decimal text as a bare JSON number when it is a valid literal,
/// otherwise as a string.  Either way the digits are untouched.
fn serialize_number<S: Serializer>(text: &str, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if is_json_number_literal(text) {
        if let Ok(raw) = RawValue::from_string(text.to_owned()) {
            return raw.serialize(serializer);
        }
    }
    serializer.serialize_str(text)
}
