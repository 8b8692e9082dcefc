//! Events - Results of background work, sent back to the render loop

use crate::chat::ChatProgress;
use crate::error::ApiResult;
use crate::lists::Toggle;
use crate::models::{Paginated, Program, ProgramList, User};
use crate::profile::ProfileData;

/// Async results delivered over the service's event channel
#[derive(Debug)]
pub enum AppEvent {
    // ========== Session ==========
    /// Startup validation of the stored session finished
    SessionRestored(Option<User>),
    LoggedIn(ApiResult<User>),
    /// The session was cleared, by logout or by a failed refresh
    SessionEnded,

    // ========== Catalog ==========
    SearchLoaded {
        seq: u64,
        result: ApiResult<Paginated<Program>>,
    },
    ListProgramsLoaded {
        seq: u64,
        result: ApiResult<Vec<Program>>,
    },
    FilterOptionsLoaded {
        countries: ApiResult<Vec<String>>,
        names: ApiResult<Vec<String>>,
    },

    // ========== Saved lists ==========
    ListsLoaded {
        session_epoch: u64,
        result: ApiResult<Vec<ProgramList>>,
    },
    ListCreated(ApiResult<ProgramList>),
    ListEdited(ApiResult<ProgramList>),
    ListDeleted {
        id: String,
        result: ApiResult<()>,
    },
    MembershipUpdated {
        toggle: Toggle,
        result: ApiResult<ProgramList>,
    },

    // ========== Chat ==========
    HistoryLoaded(ApiResult<bool>),
    HistoryCleared(ApiResult<()>),
    ChatProgress(ChatProgress),
    ChatFinished {
        session_epoch: u64,
        result: ApiResult<String>,
    },

    // ========== Profile ==========
    ProfileLoaded {
        session_epoch: u64,
        data: ProfileData,
    },
}
