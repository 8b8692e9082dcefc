//! Commands - User intentions sent from the terminal front-end to the service
//!
//! Key presses are translated into these by the renderer; the service
//! applies them to [`AppState`](super::AppState) and starts any backend work.

use super::router::Route;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ========== Application ==========
    Quit,
    Navigate(Route),
    ToggleHelp,
    /// Close the open dialog, or step back out of the current context
    Back,

    // ========== Text input ==========
    InsertChar(char),
    DeleteChar,
    ClearInput,
    /// Enter in a text field; what it does depends on where the input is
    Submit,

    // ========== Session ==========
    Logout,

    // ========== Selection ==========
    SelectPrevious,
    SelectNext,
    /// Switch between the program and saved-list panes
    FocusNext,
    /// Enter on a selected item
    Activate,

    // ========== Catalog ==========
    OpenFilters,
    /// Move between filter groups inside the filter picker
    FilterGroup(isize),
    ToggleFilterOption,
    ResetFilters,
    NextPage,
    PreviousPage,
    CyclePageSize,
    CycleSort,
    CopyLink,
    /// Move the lower bound of the estimated-cost window by whole steps
    AdjustCostMin(i64),
    AdjustCostMax(i64),

    // ========== Saved lists ==========
    NewList,
    EditList,
    DeleteList,
    ConfirmDelete,
    /// Pick lists for the selected program
    OpenMembership,
    ExitList,

    // ========== Chat ==========
    ClearHistory,
    ScrollUp,
    ScrollDown,

    // ========== Profile ==========
    AskAboutTrait,
    ReloadProfile,
}
