//! Domain models.
//!
//! Plain data passed between routes, services and stores. Nothing here
//! touches storage; persistence lives behind the traits in [`crate::store`].

pub mod audit;
pub mod catalog;
pub mod context;
pub mod inventory;
pub mod message;
pub mod note;
pub mod sale;
pub mod session;
pub mod shape;
pub mod user;

pub use audit::{AuditAction, AuditEntry, NewAuditEntry};
pub use catalog::{CatalogEntry, CatalogInput, NewCatalogEntry};
pub use context::RequestContext;
pub use inventory::{CreateInventoryInput, InventoryFilter, InventoryRecord, RestockInput};
pub use message::{Conversation, Message, NewMessage, OpenConversationInput, SendMessageInput};
pub use note::{Note, NoteInput};
pub use sale::{CreateSaleInput, NewSale, Sale, SaleFilter, SaleOutcome, compute_profit};
pub use session::{CurrentUser, keys as session_keys};
pub use shape::{AppendPipeLogInput, DEFAULT_SHAPE_COLOR, MapShape, NewPipeLog, PipeLog, ShapeInput};
pub use user::{CreateUserInput, LoginInput, NewUser, User, UserCredentials};
