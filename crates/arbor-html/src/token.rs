use core::fmt;

use serde::{Deserialize, Serialize};

/// An attribute on a start tag token.
///
/// Per [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
/// "a list of attributes, each of which has a name and a value"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value"
    #[serde(default)]
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the
/// following tokens: DOCTYPE, start tag, end tag, comment, character,
/// end-of-file."
///
/// Serialized as an object tagged by `"type"`, e.g.
/// `{"type": "start_tag", "name": "p"}`. Missing fields take their
/// "when the token is created" values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Token {
    /// "DOCTYPE tokens have a name, a public identifier, a system identifier,
    /// and a force-quirks flag. When a DOCTYPE token is created, its name,
    /// public identifier, and system identifier must be marked as missing
    /// (which is a distinct state from the empty string), and the force-quirks
    /// flag must be set to off (its other state is on)."
    Doctype {
        /// "a name"
        #[serde(default)]
        name: Option<String>,
        /// "a public identifier"
        #[serde(default)]
        public_identifier: Option<String>,
        /// "a system identifier"
        #[serde(default)]
        system_identifier: Option<String>,
        /// "a force-quirks flag"
        #[serde(default)]
        force_quirks: bool,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes"
    StartTag {
        /// "a tag name"
        name: String,
        /// "a self-closing flag"
        #[serde(default)]
        self_closing: bool,
        /// "a list of attributes"
        #[serde(default)]
        attributes: Vec<Attribute>,
    },

    /// End tag token. Attributes and the self-closing flag on end tags are
    /// parse errors the tokenizer reports, so only the name is carried.
    EndTag {
        /// "a tag name"
        name: String,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// "data"
        #[serde(default)]
        data: String,
    },

    /// "Comment and character tokens have data."
    Character {
        /// "data"
        data: char,
    },

    /// End-of-file token signals the end of input.
    EndOfFile,
}

impl Token {
    /// A doctype token with the given name and missing identifiers.
    #[must_use]
    pub fn doctype(name: &str) -> Self {
        Self::Doctype {
            name: Some(name.to_string()),
            public_identifier: None,
            system_identifier: None,
            force_quirks: false,
        }
    }

    /// A start tag with no attributes and the self-closing flag unset.
    #[must_use]
    pub fn start_tag(name: &str) -> Self {
        Self::StartTag {
            name: name.to_string(),
            self_closing: false,
            attributes: Vec::new(),
        }
    }

    /// An end tag.
    #[must_use]
    pub fn end_tag(name: &str) -> Self {
        Self::EndTag {
            name: name.to_string(),
        }
    }

    /// A comment token.
    #[must_use]
    pub fn comment(data: &str) -> Self {
        Self::Comment {
            data: data.to_string(),
        }
    }

    /// Create a character token with the given character.
    #[must_use]
    pub const fn character(c: char) -> Self {
        Self::Character { data: c }
    }

    /// One character token per char of `text`.
    pub fn characters(text: &str) -> impl Iterator<Item = Self> + '_ {
        text.chars().map(Self::character)
    }

    /// Add an attribute to a start tag. Other tokens are returned unchanged.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        if let Self::StartTag { attributes, .. } = &mut self {
            attributes.push(Attribute::new(name, value));
        }
        self
    }

    /// Set the self-closing flag of a start tag. Other tokens are returned
    /// unchanged.
    #[must_use]
    pub fn self_closing(mut self) -> Self {
        if let Self::StartTag { self_closing, .. } = &mut self {
            *self_closing = true;
        }
        self
    }

    /// Returns true if this is an end-of-file token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfFile)
    }

    /// Tag name of a start or end tag.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Whether this is a start tag whose self-closing flag is set.
    #[must_use]
    pub const fn is_self_closing_start_tag(&self) -> bool {
        matches!(
            self,
            Self::StartTag {
                self_closing: true,
                ..
            }
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype {
                name,
                public_identifier,
                system_identifier,
                force_quirks,
            } => {
                write!(f, "DOCTYPE")?;
                if let Some(n) = name {
                    write!(f, " {n}")?;
                }
                if let Some(pub_id) = public_identifier {
                    write!(f, " PUBLIC \"{pub_id}\"")?;
                }
                if let Some(sys_id) = system_identifier {
                    write!(f, " SYSTEM \"{sys_id}\"")?;
                }
                if *force_quirks {
                    write!(f, " (force-quirks)")?;
                }
                Ok(())
            }
            Self::StartTag {
                name,
                self_closing,
                attributes,
            } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name } => write!(f, "</{name}>"),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
            Self::Character { data } => match data {
                '\n' => write!(f, "Character(\\n)"),
                '\t' => write!(f, "Character(\\t)"),
                ' ' => write!(f, "Character(SPACE)"),
                c => write!(f, "Character({c})"),
            },
            Self::EndOfFile => write!(f, "EOF"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_marks_whitespace() {
        assert_eq!(Token::character(' ').to_string(), "Character(SPACE)");
        assert_eq!(Token::start_tag("br").self_closing().to_string(), "<br />");
        assert_eq!(Token::doctype("html").to_string(), "DOCTYPE html");
    }

    #[test]
    fn builders_ignore_non_start_tags() {
        assert_eq!(
            Token::end_tag("p").with_attribute("id", "x").self_closing(),
            Token::end_tag("p")
        );
    }
}
