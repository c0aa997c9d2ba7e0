//! Paged loading of one library list.
//!
//! [`PagingMachine`] is the synchronous reducer holding all paging state.
//! [`PagingSession`] runs it on a dedicated task, executes its effects and
//! publishes snapshots through a [`PagingHandle`].

mod machine;
mod options;
mod session;
mod state;

pub use machine::{
    FetchSlot, FetchTicket, PageRequest, PagingEffect, PagingMachine, PagingMessage, PagingUpdate,
};
pub use options::{DEFAULT_PAGE_SIZE, PagingOptions, SMALL_PAGE_SIZE};
pub use session::{PagingHandle, PagingSession, SessionClosed};
pub use state::{BackgroundState, LibraryEvent, LibraryState, PagingIntent, PagingSnapshot};
