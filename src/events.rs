use crate::error::{Result, read_json};
use crate::matches::MatchId;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const PATH_SEPARATOR: char = '.';

pub fn events_path(base_dir: &Path, match_id: MatchId) -> PathBuf {
    base_dir.join("events").join(format!("{}.json", match_id))
}

/// An event with nested objects collapsed into dotted paths.
///
/// `{"shot": {"outcome": {"name": "Goal"}}}` becomes the single field
/// `shot.outcome.name`. Arrays and scalars (including `null`) are leaves, so
/// `location` stays a two- or three-element array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatEvent {
    fields: BTreeMap<String, Value>,
}

impl FlatEvent {
    pub fn from_value(event: &Value) -> Self {
        let mut fields = BTreeMap::new();
        // A bare scalar or array has no field names to attach.
        if let Value::Object(map) = event {
            flatten_into(&mut fields, None, map);
        }
        Self { fields }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    pub fn has(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    pub fn str_at(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    /// Integers only; floats with a fractional part are treated as absent.
    pub fn i64_at(&self, path: &str) -> Option<i64> {
        let value = self.get(path)?;
        value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| f as i64)
        })
    }

    /// True when the field holds exactly `expected`. Absent fields never match.
    pub fn is(&self, path: &str, expected: &str) -> bool {
        self.str_at(path) == Some(expected)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn flatten_into(out: &mut BTreeMap<String, Value>, prefix: Option<&str>, map: &Map<String, Value>) {
    for (key, value) in map {
        let path = match prefix {
            Some(prefix) => format!("{}{}{}", prefix, PATH_SEPARATOR, key),
            None => key.clone(),
        };

        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(out, Some(&path), inner),
            Value::Object(_) => {}
            other => {
                out.insert(path, other.clone());
            }
        }
    }
}

pub fn flatten_events(events: &[Value]) -> Vec<FlatEvent> {
    events.iter().map(FlatEvent::from_value).collect()
}

/// Lazily reads `<base>/events/<id>.json` for each id, in order.
///
/// Single pass: the stream is consumed as it is iterated. A missing file is an
/// error item here; callers that tolerate gaps check existence first.
pub struct EventStream<I> {
    events_dir: PathBuf,
    ids: I,
}

impl<I> Iterator for EventStream<I>
where
    I: Iterator<Item = MatchId>,
{
    type Item = Result<(MatchId, Vec<Value>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let match_id = self.ids.next()?;
        let path = self.events_dir.join(format!("{}.json", match_id));
        Some(read_json(&path).map(|events| (match_id, events)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

pub fn iter_events_for_matches<I>(base_dir: &Path, match_ids: I) -> EventStream<I::IntoIter>
where
    I: IntoIterator<Item = MatchId>,
{
    EventStream {
        events_dir: base_dir.join("events"),
        ids: match_ids.into_iter(),
    }
}
