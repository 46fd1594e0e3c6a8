//! [Infra § 8 Namespaces](https://infra.spec.whatwg.org/#namespaces)

use strum_macros::{Display, EnumString};

/// [Infra § 8 Namespaces](https://infra.spec.whatwg.org/#namespaces)
///
/// The namespaces an element or attribute can belong to. `Display` and
/// `FromStr` use the namespace URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
pub enum Namespace {
    /// "The HTML namespace is `http://www.w3.org/1999/xhtml`."
    #[default]
    #[strum(serialize = "http://www.w3.org/1999/xhtml")]
    Html,
    /// "The MathML namespace is `http://www.w3.org/1998/Math/MathML`."
    #[strum(serialize = "http://www.w3.org/1998/Math/MathML")]
    MathMl,
    /// "The SVG namespace is `http://www.w3.org/2000/svg`."
    #[strum(serialize = "http://www.w3.org/2000/svg")]
    Svg,
    /// "The XLink namespace is `http://www.w3.org/1999/xlink`."
    #[strum(serialize = "http://www.w3.org/1999/xlink")]
    XLink,
    /// "The XML namespace is `http://www.w3.org/XML/1998/namespace`."
    #[strum(serialize = "http://www.w3.org/XML/1998/namespace")]
    Xml,
    /// "The XMLNS namespace is `http://www.w3.org/2000/xmlns/`."
    #[strum(serialize = "http://www.w3.org/2000/xmlns/")]
    XmlNs,
}

impl Namespace {
    /// Short prefix used when printing foreign elements (`svg`, `math`),
    /// `None` for HTML.
    #[must_use]
    pub const fn display_prefix(self) -> Option<&'static str> {
        match self {
            Self::Html => None,
            Self::MathMl => Some("math"),
            Self::Svg => Some("svg"),
            Self::XLink => Some("xlink"),
            Self::Xml => Some("xml"),
            Self::XmlNs => Some("xmlns"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_namespace_urls() {
        assert_eq!(
            Namespace::from_str("http://www.w3.org/2000/svg"),
            Ok(Namespace::Svg)
        );
        assert!(Namespace::from_str("svg").is_err());
        assert_eq!(Namespace::Html.to_string(), "http://www.w3.org/1999/xhtml");
    }
}
