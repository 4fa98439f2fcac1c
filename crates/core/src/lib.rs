pub mod allocator;
pub mod auth;
pub mod config;
pub(crate) mod db;
pub mod error;
pub mod ledger;
pub mod snapshot;
pub mod table;
pub mod ticket;

pub use allocator::{GuestDraft, ProposedSeat, SeatAllocator, StagedGuest, TicketLookup};
pub use auth::{
    create_authenticator, ApiKeyAuthenticator, AuthError, AuthRequest, Authenticator, Identity,
    NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, Config,
    ConfigError, DatabaseConfig, SanitizedConfig, SeatingConfig, ServerConfig,
};
pub use error::SeatingError;
pub use ledger::{Assignment, AssignmentEdit};
pub use snapshot::{Occupant, RoomSnapshot, TableSnapshot};
pub use table::TableBlock;
pub use ticket::{
    normalize_ticket_number, ImportOutcome, Ticket, TicketImportEntry, TicketStats,
};
