//! Tree construction: insertion modes, the stack of open elements, and the
//! rules for foreign content.

mod core;
mod error;
mod foreign_content;
mod in_body;
mod open_elements;
mod quirks;

pub use self::core::{ConstructorOptions, InsertionMode, TreeConstructor};
pub(crate) use self::foreign_content::foreign_attribute;
pub use self::error::{ParseError, ParseErrorKind, TreeConstructionError};
pub use self::open_elements::{OpenElements, Scope};
