//! TUI Widgets - Reusable UI components

mod flash_bar;
mod header;
mod input;
mod list_row;
pub mod markdown;
mod message_area;
pub mod modal;
mod pagination;
mod program_card;
mod sidebar;

pub use flash_bar::{FlashBar, FlashBarState};
pub use header::Header;
pub use input::InputWidget;
pub use list_row::ListRow;
pub use message_area::MessageArea;
pub use modal::{ConfirmModal, FilterModal, HelpModal, ListDialogModal, MembershipModal};
pub use pagination::PaginationBar;
pub use program_card::ProgramCard;
pub use sidebar::Sidebar;
