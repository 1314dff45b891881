//! Service layer
//!
//! Contains business logic separated from HTTP handlers:
//! paging, collection resolution, document building and accept-list
//! request validation.

pub mod acceptlist;
pub mod document;
pub mod paging;
pub mod resolver;

pub use acceptlist::{AcceptListDocument, AcceptListUpdate, parse_update_request};
pub use document::{CollectionDocument, Marshaller, marshal_json};
pub use paging::{PageLink, Window, compute_window};
pub use resolver::{CollectionResolver, ItemForm, ResolveCollection, ResolveError};
