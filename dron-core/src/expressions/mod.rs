//! Placeholder grammar used inside step templates.
//!
//! A template is plain text with zero or more `{{ ... }}` placeholders:
//!
//! - `{{login}}` is the whole raw response of step `login`;
//! - `{{login.data.items[0].id}}` / `{{login["x-token"]}}` walk the response parsed as JSON;
//! - `{{login#/data/items/0/id}}` does the same with an RFC 6901 pointer;
//! - `{{$params.base}}` is the current value of the sequence param `base`.

mod json_pointer;
mod path;
mod placeholder;
mod template;

pub use json_pointer::{JsonPointer, JsonPointerError};
pub use path::{PathError, PathSegment, ValuePath};
pub use placeholder::{parse_reference, Reference, ReferenceError, Selector};
pub use template::{parse_template, Placeholder, Segment, Template, TemplateError};
