//! Metric value object.
//!
//! A [`Metric`] is a single named, timestamped, tagged measurement. Name,
//! value and timestamp are fixed at construction; tags may only be appended
//! to, builder-style, never mutated or removed.

use smallvec::SmallVec;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Ordered tag list; most metrics carry zero or one tag.
pub type TagList = SmallVec<[(String, String); 4]>;

/// Typed metric value; exactly one variant is populated.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// Signed integer value
    Signed(i64),
    /// Free-form text value
    Text(String),
    /// Floating point value
    Double(f64),
    /// Unsigned integer value (cumulative OS counters, byte counts)
    Unsigned(u64),
}

impl MetricValue {
    /// Wire type id, matching the variant order used by legacy consumers:
    /// 0 = signed int, 1 = text, 2 = double, 3 = unsigned int.
    pub fn type_id(&self) -> u8 {
        match self {
            MetricValue::Signed(_) => 0,
            MetricValue::Text(_) => 1,
            MetricValue::Double(_) => 2,
            MetricValue::Unsigned(_) => 3,
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Signed(i) => Some(*i as f64),
            MetricValue::Double(f) => Some(*f),
            MetricValue::Unsigned(u) => Some(*u as f64),
            MetricValue::Text(_) => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Signed(i) => write!(f, "{}", i),
            MetricValue::Text(s) => write!(f, "{}", s),
            MetricValue::Double(d) => write!(f, "{}", d),
            MetricValue::Unsigned(u) => write!(f, "{}", u),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Signed(v)
    }
}

impl From<i32> for MetricValue {
    fn from(v: i32) -> Self {
        MetricValue::Signed(v as i64)
    }
}

impl From<u64> for MetricValue {
    fn from(v: u64) -> Self {
        MetricValue::Unsigned(v)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Double(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_owned())
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

/// A single measurement on its way to one or more sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    name: String,
    value: MetricValue,
    timestamp: SystemTime,
    tags: TagList,
}

impl Metric {
    /// Creates a metric timestamped now.
    ///
    /// The name must be non-empty; duplicate tag keys added later are a
    /// caller error and are passed through as-is.
    pub fn new<V: Into<MetricValue>, S: Into<String>>(value: V, name: S) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "metric name must be non-empty");
        Metric {
            name,
            value: value.into(),
            timestamp: SystemTime::now(),
            tags: TagList::new(),
        }
    }

    /// Returns the metric name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the metric value
    pub fn value(&self) -> &MetricValue {
        &self.value
    }

    /// Returns the creation timestamp
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Returns the ordered tag list
    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    /// Appends one tag, builder-style.
    pub fn with_tag<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Appends a sequence of tags, builder-style, preserving order.
    pub fn with_tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags
            .extend(tags.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Returns a copy with the given tags placed ahead of the metric's own.
    ///
    /// Used for global-tag decoration at the agent boundary: on the wire,
    /// global tags precede per-metric tags.
    pub(crate) fn with_prefix_tags(&self, prefix: &[(String, String)]) -> Metric {
        let mut tags = TagList::with_capacity(prefix.len() + self.tags.len());
        tags.extend(prefix.iter().cloned());
        tags.extend(self.tags.iter().cloned());
        Metric {
            name: self.name.clone(),
            value: self.value.clone(),
            timestamp: self.timestamp,
            tags,
        }
    }

    /// Milliseconds since the Unix epoch, for wire formats.
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    /// Comma-joined `key=value` rendering of the tag list.
    pub fn format_tags(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.tags {
            if !out.is_empty() {
                out.push(',');
            }
            out.push_str(key);
            out.push('=');
            out.push_str(value);
        }
        out
    }
}
