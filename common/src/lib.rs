//! Jurnal Bimbingan Common Library
//!
//! Core shared by the CLI and the browser (WASM) build: signature pads,
//! records, the key-value record store, history and rendering.

pub mod autosave;
pub mod error;
pub mod history;
pub mod input;
pub mod notify;
pub mod record;
pub mod render;
pub mod session;
pub mod signature;
pub mod store;

pub use autosave::{Debouncer, AUTOSAVE_DELAY};
pub use error::{Error, Result};
pub use history::{filter, list_summaries, summarize, HistoryEntry, HistoryListing};
pub use input::{InputEvent, PointerPhase, StrokeCommand, SurfaceOffset, TouchPhase};
pub use notify::{Confirm, Notifier, Severity, Toast};
pub use record::{FormField, FormState, Record, SignatureRole, ValidationReport};
pub use render::{render, Document, HistoryItemView, RenderMode, SignatureSource};
pub use session::FormSession;
pub use signature::{DecodedSignature, Point, SignatureSurface, SurfaceId};
pub use store::{KeyValueBackend, MemoryBackend, RecordStore, DRAFT_KEY, RECORD_PREFIX};
