//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod activity;
pub mod contact;
pub mod crm;
pub mod order;
pub mod order_code;
pub mod pagination;
pub mod product;
pub mod ticket;
pub mod user;
pub mod validation;

pub use activity::ActivityKind;
pub use contact::{Email, WhatsApp};
pub use crm::{CustomerFilter, CustomerSort, NoteCreate, NoteText, TagCreate, TagName};
pub use order::{NewOrder, OrderCreate, OrderStatus, StatusUpdate};
pub use pagination::{Listing, Paginated, Pagination, PaginationParams};
pub use product::{
    NewProduct, ProductChanges, ProductCreate, ProductFilter, ProductSort, ProductUpdate, Slug,
};
pub use ticket::{NewTicket, TicketCreate, TicketStatus};
pub use user::{LoginRequest, NewUser, RegisterRequest};
pub use validation::ValidationError;
