//! Constraint rules.
//!
//! A field declares its rules as a comma separated list such as
//! `"required,min=1,max=100"`. The same parsed rules drive runtime
//! validation and the schema annotations emitted for documentation.

use std::fmt;

/// The kind of a single declared rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Value must be non-zero, or set when optional.
    Required,
    /// Skip the remaining rules when the value is zero or unset.
    OmitEmpty,
    /// Lower bound on length, value or item count.
    Min,
    /// Upper bound on length, value or item count.
    Max,
    /// Exact length, value or item count.
    Len,
    /// Value must be one of a whitespace separated list.
    OneOf,
    /// Email address.
    Email,
    /// Absolute URI.
    Url,
    /// UUID in canonical text form.
    Uuid,
    /// Date-time in the layout given by the param (RFC 3339 when empty).
    Datetime,
    /// Inclusive lower bound.
    Gte,
    /// Inclusive upper bound.
    Lte,
    /// Exclusive lower bound.
    Gt,
    /// Exclusive upper bound.
    Lt,
    /// A rule registered by the application.
    Custom(String),
}

impl ConstraintKind {
    /// Maps a declared tag to its kind. Aliases collapse onto one kind.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "required" => Self::Required,
            "omitempty" => Self::OmitEmpty,
            "min" => Self::Min,
            "max" => Self::Max,
            "len" => Self::Len,
            "oneof" => Self::OneOf,
            "email" => Self::Email,
            "url" | "uri" => Self::Url,
            "uuid" | "uuid3" | "uuid4" | "uuid5" => Self::Uuid,
            "datetime" => Self::Datetime,
            "gte" => Self::Gte,
            "lte" => Self::Lte,
            "gt" => Self::Gt,
            "lt" => Self::Lt,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Canonical tag for this kind.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::OmitEmpty => "omitempty",
            Self::Min => "min",
            Self::Max => "max",
            Self::Len => "len",
            Self::OneOf => "oneof",
            Self::Email => "email",
            Self::Url => "url",
            Self::Uuid => "uuid",
            Self::Datetime => "datetime",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Custom(tag) => tag,
        }
    }

    /// Rules whose param is a number compared against length, value or count.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        matches!(
            self,
            Self::Min | Self::Max | Self::Len | Self::Gte | Self::Lte | Self::Gt | Self::Lt
        )
    }

    /// Rules that check the textual format of a string.
    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(self, Self::Email | Self::Url | Self::Uuid | Self::Datetime)
    }
}

/// One declared validation rule: a kind plus its literal param.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstraintRule {
    /// What the rule checks.
    pub kind: ConstraintKind,
    /// The literal text after `=`, empty when the rule takes none.
    pub param: String,
}

impl ConstraintRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(kind: ConstraintKind, param: impl Into<String>) -> Self {
        Self {
            kind,
            param: param.into(),
        }
    }

    /// Parses a declared rule list such as `"required,min=1,oneof=a b"`.
    ///
    /// Entries are trimmed and empty entries are ignored. Order is kept.
    #[must_use]
    pub fn parse_list(declared: &str) -> Vec<Self> {
        declared
            .split(',')
            .map(str::trim)
            .filter(|rule| !rule.is_empty())
            .map(|rule| {
                let (tag, param) = rule.split_once('=').unwrap_or((rule, ""));
                Self::new(ConstraintKind::from_tag(tag.trim()), param.trim())
            })
            .collect()
    }

    /// The param as a number, for bound rules.
    #[must_use]
    pub fn numeric_param(&self) -> Option<f64> {
        self.param.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// The param as a length or item count.
    #[must_use]
    pub fn count_param(&self) -> Option<u64> {
        self.param.parse::<u64>().ok()
    }

    /// The allowed values of a `oneof` rule.
    #[must_use]
    pub fn choices(&self) -> Vec<&str> {
        self.param.split_whitespace().collect()
    }
}

impl fmt::Display for ConstraintRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.param.is_empty() {
            f.write_str(self.kind.tag())
        } else {
            write!(f, "{}={}", self.kind.tag(), self.param)
        }
    }
}
