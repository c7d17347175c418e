//! Published enumeration tables of the update agent.
//!
//! Snapshots keep these fields as the raw `i32` the agent reported so that
//! unknown future values survive a round trip; these types give the known
//! values names.

use strum_macros::{Display, EnumIter, FromRepr};

macro_rules! published_code {
    ($($name:ident),+ $(,)?) => {
        $(
            impl $name {
                /// The integer the agent uses for this value.
                #[must_use]
                pub const fn code(self) -> i32 {
                    self as i32
                }

                #[must_use]
                pub fn from_code(code: i32) -> Option<Self> {
                    Self::from_repr(code)
                }
            }

            impl From<$name> for crate::Value {
                fn from(value: $name) -> Self {
                    crate::Value::I32(value.code())
                }
            }
        )+
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum OperationResultCode {
    NotStarted = 0,
    InProgress = 1,
    Succeeded = 2,
    SucceededWithErrors = 3,
    Failed = 4,
    Aborted = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum ServerSelection {
    Default = 0,
    ManagedServer = 1,
    WindowsUpdate = 2,
    Others = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum DownloadPriority {
    Low = 1,
    Normal = 2,
    High = 3,
    ExtraHigh = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum DeploymentAction {
    None = 0,
    Installation = 1,
    Uninstallation = 2,
    Detection = 3,
    OptionalInstallation = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum DownloadPhase {
    Initializing = 1,
    Downloading = 2,
    Verifying = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum InstallationImpact {
    Normal = 0,
    Minor = 1,
    RequiresExclusiveHandling = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum InstallationRebootBehavior {
    NeverReboots = 0,
    AlwaysRequiresReboot = 1,
    CanRequestReboot = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum UpdateOperation {
    Installation = 1,
    Uninstallation = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum UpdateExceptionContext {
    General = 1,
    WindowsDriver = 2,
    WindowsInstaller = 3,
    SearchIncomplete = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum UpdateType {
    Software = 1,
    Driver = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum AutomaticUpdatesNotificationLevel {
    NotConfigured = 0,
    Disabled = 1,
    NotifyBeforeDownload = 2,
    NotifyBeforeInstallation = 3,
    ScheduledInstallation = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum AutomaticUpdatesScheduledInstallationDay {
    EveryDay = 0,
    EverySunday = 1,
    EveryMonday = 2,
    EveryTuesday = 3,
    EveryWednesday = 4,
    EveryThursday = 5,
    EveryFriday = 6,
    EverySaturday = 7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum AutoDownloadMode {
    LetWindowsUpdateDecide = 0,
    NeverAutoDownload = 1,
    AlwaysAutoDownload = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum AutoSelectionMode {
    LetWindowsUpdateDecide = 0,
    AutoSelectIfDownloaded = 1,
    NeverAutoSelect = 2,
    AlwaysAutoSelect = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum UpdateServiceRegistrationState {
    NotRegistered = 1,
    RegistrationPending = 2,
    Registered = 3,
}

/// Bit flags accepted by `AddService2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum AddServiceFlag {
    AllowPendingRegistration = 0x1,
    AllowOnlineRegistration = 0x2,
    RegisterServiceWithAU = 0x4,
}

impl AddServiceFlag {
    /// Combines flags into the integer passed to the agent.
    #[must_use]
    pub fn combine(flags: &[AddServiceFlag]) -> i32 {
        flags.iter().fold(0, |acc, flag| acc | flag.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromRepr, EnumIter)]
#[repr(i32)]
pub enum UpdateLockdownOption {
    WebControl = 0x1,
}

published_code!(
    OperationResultCode,
    ServerSelection,
    DownloadPriority,
    DeploymentAction,
    DownloadPhase,
    InstallationImpact,
    InstallationRebootBehavior,
    UpdateOperation,
    UpdateExceptionContext,
    UpdateType,
    AutomaticUpdatesNotificationLevel,
    AutomaticUpdatesScheduledInstallationDay,
    AutoDownloadMode,
    AutoSelectionMode,
    UpdateServiceRegistrationState,
    AddServiceFlag,
    UpdateLockdownOption,
);

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn codes<E: IntoEnumIterator + Copy>(code: fn(E) -> i32) -> Vec<i32> {
        E::iter().map(code).collect()
    }

    #[test]
    fn operation_result_codes() {
        assert_eq!(codes(OperationResultCode::code), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(OperationResultCode::Succeeded.code(), 2);
        assert_eq!(OperationResultCode::Failed.code(), 4);
    }

    #[test]
    fn server_selection_codes() {
        assert_eq!(ServerSelection::Default.code(), 0);
        assert_eq!(ServerSelection::WindowsUpdate.code(), 2);
        assert_eq!(codes(ServerSelection::code), vec![0, 1, 2, 3]);
    }

    #[test]
    fn download_priority_codes() {
        assert_eq!(codes(DownloadPriority::code), vec![1, 2, 3, 4]);
    }

    #[test]
    fn remaining_tables() {
        assert_eq!(codes(DeploymentAction::code), vec![0, 1, 2, 3, 4]);
        assert_eq!(codes(DownloadPhase::code), vec![1, 2, 3]);
        assert_eq!(codes(InstallationImpact::code), vec![0, 1, 2]);
        assert_eq!(codes(InstallationRebootBehavior::code), vec![0, 1, 2]);
        assert_eq!(codes(UpdateOperation::code), vec![1, 2]);
        assert_eq!(codes(UpdateExceptionContext::code), vec![1, 2, 3, 4]);
        assert_eq!(codes(UpdateType::code), vec![1, 2]);
        assert_eq!(codes(AutomaticUpdatesNotificationLevel::code), vec![0, 1, 2, 3, 4]);
        assert_eq!(
            codes(AutomaticUpdatesScheduledInstallationDay::code),
            vec![0, 1, 2, 3, 4, 5, 6, 7]
        );
        assert_eq!(codes(AutoDownloadMode::code), vec![0, 1, 2]);
        assert_eq!(codes(AutoSelectionMode::code), vec![0, 1, 2, 3]);
        assert_eq!(codes(UpdateServiceRegistrationState::code), vec![1, 2, 3]);
        assert_eq!(codes(AddServiceFlag::code), vec![1, 2, 4]);
        assert_eq!(codes(UpdateLockdownOption::code), vec![1]);
    }

    #[test]
    fn from_code_rejects_unknown_values() {
        assert_eq!(
            OperationResultCode::from_code(3),
            Some(OperationResultCode::SucceededWithErrors)
        );
        assert_eq!(OperationResultCode::from_code(6), None);
        assert_eq!(DownloadPriority::from_code(0), None);
    }

    #[test]
    fn flags_combine() {
        assert_eq!(
            AddServiceFlag::combine(&[
                AddServiceFlag::AllowPendingRegistration,
                AddServiceFlag::RegisterServiceWithAU
            ]),
            5
        );
        assert_eq!(AddServiceFlag::combine(&[]), 0);
    }

    #[test]
    fn enum_values_cross_as_i32() {
        assert_eq!(
            crate::Value::from(ServerSelection::Others),
            crate::Value::I32(3)
        );
    }
}
